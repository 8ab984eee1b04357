//! # LZ77 and LZW symbol coders
//!
//! This crate provides two compression algorithms, [`Lz77`] and [`Lzw`], that turn a raw byte
//! stream into a stream of typed [`Symbol`]s and back. How symbols end up on the wire is a
//! separate concern handled by the [`codec`] module, so algorithms and formats vary
//! independently.
//!
//! LZ77 emits literals and back-references found by a sliding window over the input. LZW emits
//! references into a dictionary that both sides grow in lock-step, with an explicit reset
//! symbol whenever the dictionary fills up.
//!
//! Exemplary use:
//!
//! ```
//! use lzkit::{Algorithm, Lzw, Symbol};
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//!
//! let lzw = Lzw::new();
//! let symbols = lzw.compress_to_vec(data).unwrap();
//! assert_eq!(symbols[9], Symbol::DictRef(257));
//!
//! let restored = lzw.decompress_to_vec(&symbols).unwrap();
//! assert_eq!(&restored[..], &data[..]);
//! ```
//!
//! Writing the symbols to a wire format and reading them back:
//!
//! ```
//! use lzkit::{codec::{self, Format}, Algorithm, Lz77, Registry};
//! let data = b"abcdebcdfghij";
//! let mut wire = vec![];
//!
//! let mut writer = Format::Packed.writer(&mut wire);
//! Lz77::new().compress(&mut &data[..], &mut *writer).unwrap();
//! drop(writer);
//!
//! let mut reader = codec::open(&wire[..]).unwrap();
//! let algorithm = Registry::default().for_reader(&*reader).unwrap();
//! let mut restored = vec![];
//! algorithm.decompress(&mut *reader, &mut restored).unwrap();
//! assert_eq!(&restored[..], &data[..]);
//! ```
#![forbid(unsafe_code)]

/// Matches shorter than this are not worth a back-reference.
pub const MIN_MATCH: u32 = 3;
/// The default maximum back-reference distance.
pub const DEFAULT_MAX_DISTANCE: u32 = 32768;
/// The default maximum back-reference length.
pub const DEFAULT_MAX_LENGTH: u32 = 258;
/// The default number of LZW dictionary entries.
pub const DEFAULT_MAX_ENTRIES: u32 = 4096;
/// The largest LZW dictionary that can be configured.
pub const MAX_ENTRIES_LIMIT: u32 = 1 << 24;
/// The largest back-reference distance that can be configured.
pub const MAX_DISTANCE_LIMIT: u32 = 1 << 24;
/// The largest back-reference length that can be configured.
pub const MAX_LENGTH_LIMIT: u32 = 1 << 16;
/// A dictionary entry number that is never assigned to any sequence.
pub const RESERVED_ENTRY: Code = 256;
/// The first dictionary entry number handed out after construction or a reset.
pub const FIRST_FREE_ENTRY: Code = 257;

/// Alias for a LZW dictionary entry number.
pub type Code = u32;

pub mod algorithm;
pub mod codec;
pub mod dictionary;
pub mod error;
pub mod lz77;
pub mod lzw;
#[cfg(feature = "async")]
pub mod nonblocking;
pub mod registry;
pub mod symbol;
pub mod window;

pub use crate::algorithm::Algorithm;
pub use crate::error::{Error, Result};
pub use crate::lz77::Lz77;
pub use crate::lzw::Lzw;
pub use crate::registry::Registry;
pub use crate::symbol::Symbol;
pub use crate::window::{Match, WindowConfig};
