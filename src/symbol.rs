//! The unit of compressed output.
use core::fmt;

use crate::Code;

/// One coded unit, produced by an algorithm and consumed by a codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A single uncompressed byte.
    Literal(u8),
    /// Copy `length` bytes starting `distance` bytes before the current output position.
    BackRef {
        /// How far back the copied bytes start, at least 1.
        distance: u32,
        /// How many bytes to copy, at least [`MIN_MATCH`](crate::MIN_MATCH).
        length: u32,
    },
    /// A reference to a LZW dictionary entry.
    DictRef(Code),
    /// Clear the dictionary state here.
    Reset,
}

impl Symbol {
    /// A short name of the variant, used in error messages and by the codecs.
    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::Literal(_) => "literal",
            Symbol::BackRef { .. } => "back-reference",
            Symbol::DictRef(_) => "dictionary reference",
            Symbol::Reset => "reset",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Symbol::Literal(byte) if byte.is_ascii_graphic() || byte == b' ' => {
                write!(f, "literal {:#04x} ({:?})", byte, char::from(byte))
            }
            Symbol::Literal(byte) => write!(f, "literal {:#04x}", byte),
            Symbol::BackRef { distance, length } => {
                write!(f, "back-reference (distance {}, length {})", distance, length)
            }
            Symbol::DictRef(entry) => write!(f, "dictionary reference {}", entry),
            Symbol::Reset => f.write_str("reset"),
        }
    }
}
