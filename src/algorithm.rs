//! The common interface of all compression algorithms.
use std::io::{Read, Write};

use crate::codec::{SymbolReader, SymbolSlice, SymbolWriter};
use crate::error::{Error, Result};
use crate::Symbol;

/// A reversible transformation between bytes and symbols.
///
/// Implementors provide the raw coding loops. The provided methods wrap them with the stream
/// framing: `compress` declares the algorithm before the first symbol and finishes the stream,
/// `decompress` refuses streams declaring a different algorithm.
pub trait Algorithm: Send + Sync {
    /// The name streams of this algorithm are tagged with.
    fn name(&self) -> &'static str;

    /// Encode all of `input` into symbols without any framing.
    fn encode_symbols(&self, input: &mut dyn Read, output: &mut dyn SymbolWriter) -> Result<()>;

    /// Decode symbols until the end of `input` without checking the algorithm tag.
    fn decode_symbols(&self, input: &mut dyn SymbolReader, output: &mut dyn Write) -> Result<()>;

    /// Compress all of `input` into a complete symbol stream.
    fn compress(&self, input: &mut dyn Read, output: &mut dyn SymbolWriter) -> Result<()> {
        output.set_algorithm(self.name())?;
        self.encode_symbols(input, output)?;
        output.finish()
    }

    /// Restore the bytes of a symbol stream.
    ///
    /// Untagged streams are accepted as they are.
    fn decompress(&self, input: &mut dyn SymbolReader, output: &mut dyn Write) -> Result<()> {
        if let Some(found) = input.algorithm() {
            if found != self.name() {
                return Err(Error::AlgorithmMismatch {
                    expected: self.name(),
                    found: found.to_owned(),
                });
            }
        }

        self.decode_symbols(input, output)
    }

    /// Compress a byte slice into a vector of symbols.
    fn compress_to_vec(&self, data: &[u8]) -> Result<Vec<Symbol>> {
        let mut input = data;
        let mut symbols = Vec::new();
        self.compress(&mut input, &mut symbols)?;
        Ok(symbols)
    }

    /// Restore the bytes of a slice of symbols.
    fn decompress_to_vec(&self, symbols: &[Symbol]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decompress(&mut SymbolSlice::untagged(symbols), &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::Algorithm;
    use crate::codec::{SymbolBuffer, SymbolSlice};
    use crate::{Error, Lz77, Lzw};

    #[test]
    fn compress_tags_the_stream() {
        let mut buffer = SymbolBuffer::new();
        Lzw::new().compress(&mut &b"abab"[..], &mut buffer).unwrap();
        assert_eq!(buffer.algorithm(), Some("lzw"));

        let mut out = vec![];
        Lzw::new().decompress(&mut buffer.reader(), &mut out).unwrap();
        assert_eq!(out, b"abab");
    }

    #[test]
    fn decompress_rejects_other_algorithms() {
        let symbols = Lz77::new().compress_to_vec(b"hello").unwrap();
        let mut tagged = SymbolSlice::tagged("lz77", &symbols);
        let mut out = vec![];
        let err = Lzw::new().decompress(&mut tagged, &mut out).unwrap_err();
        assert!(matches!(
            err,
            Error::AlgorithmMismatch { expected: "lzw", ref found } if found == "lz77"
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn algorithms_are_object_safe() {
        let algorithms: Vec<Box<dyn Algorithm>> = vec![Box::new(Lz77::new()), Box::new(Lzw::new())];
        for algorithm in &algorithms {
            let symbols = algorithm.compress_to_vec(b"to be or not to be").unwrap();
            assert_eq!(algorithm.decompress_to_vec(&symbols).unwrap(), b"to be or not to be");
        }
    }
}
