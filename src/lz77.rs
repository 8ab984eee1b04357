//! The LZ77 algorithm.
//!
//! The encoder looks for the longest earlier occurrence of the bytes at its cursor. A match of at
//! least [`MIN_MATCH`](crate::MIN_MATCH) bytes becomes a back-reference, anything else is emitted
//! as a literal byte. The decoder replays back-references from the bytes it already produced.
use std::io::{Read, Write};

use log::debug;

use crate::algorithm::Algorithm;
use crate::codec::{SymbolReader, SymbolWriter};
use crate::error::{Error, Result};
use crate::window::{SlidingWindow, WindowConfig};
use crate::Symbol;

/// The LZ77 compressor and decompressor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lz77 {
    config: WindowConfig,
}

impl Lz77 {
    /// The name of the algorithm.
    pub const NAME: &'static str = "lz77";

    /// An instance with the default window of 32 KiB and matches of up to 258 bytes.
    pub const fn new() -> Self {
        Lz77 {
            config: WindowConfig::new(),
        }
    }

    /// An instance with a custom window.
    ///
    /// Both sides of a stream must agree on the configuration.
    pub fn with_config(config: WindowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Lz77 { config })
    }

    /// The window parameters both sides use.
    pub fn config(&self) -> WindowConfig {
        self.config
    }
}

impl Algorithm for Lz77 {
    fn name(&self) -> &'static str {
        Lz77::NAME
    }

    fn encode_symbols(&self, input: &mut dyn Read, output: &mut dyn SymbolWriter) -> Result<()> {
        let mut window = SlidingWindow::reader_with(input, self.config)?;
        let (mut literals, mut references) = (0u64, 0u64);
        let mut byte = [0u8; 1];

        loop {
            if let Some(found) = window.find_past_match()? {
                window.skip(found.length as usize)?;
                output.write_symbol(Symbol::BackRef {
                    distance: found.distance,
                    length: found.length,
                })?;
                references += 1;
            } else if window.read(&mut byte)? == 1 {
                output.write_symbol(Symbol::Literal(byte[0]))?;
                literals += 1;
            } else {
                break;
            }
        }

        debug!(
            "lz77: encoded {} bytes as {} literals and {} back-references",
            window.position(),
            literals,
            references
        );
        Ok(())
    }

    fn decode_symbols(&self, input: &mut dyn SymbolReader, output: &mut dyn Write) -> Result<()> {
        let mut window = SlidingWindow::writer_with(output, self.config)?;
        while let Some(symbol) = input.read_symbol()? {
            match symbol {
                Symbol::Literal(byte) => window.write(byte)?,
                Symbol::BackRef { distance, length } => {
                    window.repeat_past_match(distance, length)?
                }
                other => {
                    return Err(Error::UnexpectedSymbol {
                        algorithm: Lz77::NAME,
                        symbol: other,
                    })
                }
            }
        }

        window.flush()?;
        debug!("lz77: decoded {} bytes", window.position());
        Ok(())
    }
}
