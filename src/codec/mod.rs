//! Moving symbols between algorithms and the wire.
//!
//! An algorithm writes its output through a [`SymbolWriter`] and reads its input through a
//! [`SymbolReader`]. Both carry an algorithm name that is set once before the first symbol, so a
//! stream can be matched to the algorithm that produced it.
//!
//! Two wire formats are provided, see [`Format`]. In-memory streams are found in the
//! [`memory`] module.
use std::io::{BufRead, Write};

use crate::error::{Error, Result};
use crate::Symbol;

pub mod memory;
pub mod packed;
pub mod xml;

pub use self::memory::{SymbolBuffer, SymbolSlice};

/// A destination for symbols.
pub trait SymbolWriter {
    /// Declare the algorithm that produces the following symbols.
    fn set_algorithm(&mut self, name: &str) -> Result<()>;
    /// Append one symbol.
    fn write_symbol(&mut self, symbol: Symbol) -> Result<()>;
    /// Terminate the stream. No symbols may follow.
    fn finish(&mut self) -> Result<()>;
}

/// A source of symbols.
pub trait SymbolReader {
    /// The algorithm the stream declares, if it is tagged at all.
    fn algorithm(&self) -> Option<&str>;
    /// The next symbol, or `None` at the end of the stream.
    fn read_symbol(&mut self) -> Result<Option<Symbol>>;
}

/// The available wire formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// One XML element per symbol. Verbose but readable.
    Xml,
    /// A compact bit-packed binary encoding.
    Packed,
}

impl Format {
    /// All formats, in order of preference for display.
    pub const ALL: [Format; 2] = [Format::Xml, Format::Packed];

    /// The name of the format.
    pub fn name(self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Packed => "packed",
        }
    }

    /// Look up a format by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Format::ALL.iter().copied().find(|format| format.name() == name)
    }

    /// Create a writer encoding symbols into `inner`.
    pub fn writer<'w, W: Write + 'w>(self, inner: W) -> Box<dyn SymbolWriter + 'w> {
        match self {
            Format::Xml => Box::new(xml::XmlWriter::new(inner)),
            Format::Packed => Box::new(packed::PackedWriter::new(inner)),
        }
    }

    /// Create a reader decoding symbols from `inner`, reading the algorithm name right away.
    pub fn reader<'r, R: BufRead + 'r>(self, inner: R) -> Result<Box<dyn SymbolReader + 'r>> {
        Ok(match self {
            Format::Xml => Box::new(xml::XmlReader::new(inner)?),
            Format::Packed => Box::new(packed::PackedReader::new(inner)?),
        })
    }

    /// Guess the format of a stream from its first byte, without consuming it.
    pub fn detect<R: BufRead>(inner: &mut R) -> Result<Self> {
        let available = inner.fill_buf()?;
        match available.first() {
            Some(&byte) if byte == packed::MAGIC[0] => Ok(Format::Packed),
            Some(&byte) if byte == b'<' || byte.is_ascii_whitespace() => Ok(Format::Xml),
            Some(&byte) => Err(Error::malformed(
                "symbol",
                format!("unrecognized stream starting with byte {:#04x}", byte),
            )),
            None => Err(Error::malformed("symbol", "empty input")),
        }
    }
}

/// Detect the format of `inner` and open a reader for it.
pub fn open<'r, R: BufRead + 'r>(mut inner: R) -> Result<Box<dyn SymbolReader + 'r>> {
    let format = Format::detect(&mut inner)?;
    format.reader(inner)
}
