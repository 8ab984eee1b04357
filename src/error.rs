//! Errors of coding, decoding and wire handling.
use std::io;

use thiserror::Error;

use crate::{Code, Symbol};

/// Result alias for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while compressing or decompressing.
///
/// End of stream is not an error; it is signalled through return values.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying source or sink failed. Buffers involved are unusable afterwards.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A symbol kind the active algorithm does not understand.
    #[error("unexpected {symbol} in a {algorithm} stream")]
    UnexpectedSymbol {
        /// The algorithm that was decoding.
        algorithm: &'static str,
        /// The offending symbol.
        symbol: Symbol,
    },

    /// The stream declares a different algorithm than the decompressor implements.
    #[error("tried to decompress {found} data with a {expected} decompressor")]
    AlgorithmMismatch {
        /// The decompressor's algorithm.
        expected: &'static str,
        /// The algorithm the stream was tagged with.
        found: String,
    },

    /// The stream carries no algorithm tag to select a decompressor with.
    #[error("symbol stream does not declare its algorithm")]
    MissingAlgorithm,

    /// A reference to a dictionary entry that does not exist at this point.
    #[error("dictionary entry {entry} is not defined (next free entry is {next_free})")]
    UndefinedEntry {
        /// The referenced entry.
        entry: Code,
        /// The entry the dictionary would hand out next.
        next_free: Code,
    },

    /// The stream needs more dictionary entries than the dictionary can hold.
    #[error("dictionary overflow: capacity of {capacity} entries exhausted without a reset")]
    DictionaryOverflow {
        /// The configured dictionary capacity.
        capacity: u32,
    },

    /// A back-reference distance outside of the valid window.
    #[error("back-reference distance {distance} outside of 1..={max}")]
    InvalidDistance {
        /// The requested distance.
        distance: u32,
        /// The largest distance valid at this point.
        max: u32,
    },

    /// A back-reference length outside of the valid range.
    #[error("back-reference length {length} outside of {min}..={max}")]
    InvalidLength {
        /// The requested length.
        length: u32,
        /// The minimum match length.
        min: u32,
        /// The configured maximum match length.
        max: u32,
    },

    /// Unusable construction parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No algorithm is registered under this name.
    #[error("unknown compression algorithm {0:?}")]
    UnknownAlgorithm(String),

    /// An algorithm is already registered under this name.
    #[error("compression algorithm {0:?} is already registered")]
    DuplicateAlgorithm(String),

    /// A symbol was written before the algorithm name.
    #[error("the algorithm name must be set before writing symbols")]
    AlgorithmNotSet,

    /// The wire data does not follow its format.
    #[error("malformed {format} stream: {message}")]
    Malformed {
        /// The wire format being read.
        format: &'static str,
        /// What was wrong.
        message: String,
    },
}

impl Error {
    pub(crate) fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        Error::Malformed {
            format,
            message: message.into(),
        }
    }

    /// Whether the error means the symbol stream is corrupt or does not belong to the decoder.
    ///
    /// Such errors are never worth retrying.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedSymbol { .. }
                | Error::AlgorithmMismatch { .. }
                | Error::MissingAlgorithm
                | Error::UndefinedEntry { .. }
                | Error::DictionaryOverflow { .. }
                | Error::InvalidDistance { .. }
                | Error::InvalidLength { .. }
                | Error::Malformed { .. }
        )
    }
}
