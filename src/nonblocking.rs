//! Compression over asynchronous byte streams.
//!
//! The coding loops are synchronous. These adapters collect the whole input from an
//! `AsyncRead`, code it in memory and hand the result to an `AsyncWrite`, so they suit inputs
//! that comfortably fit into memory.
use futures::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use log::debug;

use crate::algorithm::Algorithm;
use crate::codec::{self, Format};
use crate::error::Result;
use crate::registry::Registry;

/// Compress everything from `input` with `algorithm` and write it in `format` to `output`.
///
/// Returns the number of bytes written. `output` is flushed but not closed.
pub async fn compress<R, W>(
    algorithm: &dyn Algorithm,
    format: Format,
    mut input: R,
    mut output: W,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut data = Vec::new();
    input.read_to_end(&mut data).await?;
    let wire = compress_buffer(algorithm, format, &data)?;
    output.write_all(&wire).await?;
    output.flush().await?;
    debug!(
        "{}: compressed {} bytes into {} bytes of {}",
        algorithm.name(),
        data.len(),
        wire.len(),
        format.name()
    );
    Ok(wire.len() as u64)
}

/// Decompress a symbol stream in any format from `input`, choosing the algorithm it declares.
///
/// Returns the number of bytes written. `output` is flushed but not closed.
pub async fn decompress<R, W>(registry: &Registry, mut input: R, mut output: W) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut wire = Vec::new();
    input.read_to_end(&mut wire).await?;
    let data = decompress_buffer(registry, &wire)?;
    output.write_all(&data).await?;
    output.flush().await?;
    Ok(data.len() as u64)
}

fn compress_buffer(algorithm: &dyn Algorithm, format: Format, data: &[u8]) -> Result<Vec<u8>> {
    let mut wire = Vec::new();
    let mut writer = format.writer(&mut wire);
    algorithm.compress(&mut &data[..], &mut *writer)?;
    drop(writer);
    Ok(wire)
}

fn decompress_buffer(registry: &Registry, wire: &[u8]) -> Result<Vec<u8>> {
    let mut reader = codec::open(wire)?;
    let algorithm = registry.for_reader(&*reader)?;
    let mut data = Vec::new();
    algorithm.decompress(&mut *reader, &mut data)?;
    Ok(data)
}
