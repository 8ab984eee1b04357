//! The LZW algorithm.
//!
//! Both sides start with a dictionary of all single bytes and add one entry per emitted
//! reference, so the dictionary never travels with the data. When the encoder's dictionary is
//! full it emits [`Symbol::Reset`] and both sides start over.
use std::io::{BufReader, Read, Write};

use log::{debug, trace};

use crate::algorithm::Algorithm;
use crate::codec::{SymbolReader, SymbolWriter};
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::{Code, Symbol, DEFAULT_MAX_ENTRIES};

/// The LZW compressor and decompressor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lzw {
    max_entries: u32,
}

impl Lzw {
    /// The name of the algorithm.
    pub const NAME: &'static str = "lzw";

    /// An instance with a dictionary of 4096 entries.
    pub const fn new() -> Self {
        Lzw {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// An instance with a dictionary of `max_entries` entries, reserved ones included.
    ///
    /// At least 258 entries are needed to hold anything beyond the single bytes, and at most
    /// [`MAX_ENTRIES_LIMIT`](crate::MAX_ENTRIES_LIMIT) are accepted. Both sides of a stream must use the same size.
    pub fn with_max_entries(max_entries: u32) -> Result<Self> {
        Dictionary::check_capacity(max_entries)?;
        Ok(Lzw { max_entries })
    }

    /// The dictionary size, reserved entries included.
    pub fn max_entries(&self) -> u32 {
        self.max_entries
    }
}

impl Default for Lzw {
    fn default() -> Self {
        Lzw::new()
    }
}

impl Algorithm for Lzw {
    fn name(&self) -> &'static str {
        Lzw::NAME
    }

    fn encode_symbols(&self, input: &mut dyn Read, output: &mut dyn SymbolWriter) -> Result<()> {
        let mut dict = Dictionary::new(self.max_entries)?;
        let mut bytes = BufReader::new(input).bytes();
        // The longest known sequence ending at the cursor.
        let mut pending: Option<Code> = None;
        let (mut read, mut references, mut resets) = (0u64, 0u64, 0u64);

        loop {
            if dict.is_full() {
                trace!("lzw: dictionary full at {} entries, resetting", dict.next_free());
                dict.reset();
                output.write_symbol(Symbol::Reset)?;
                resets += 1;
            }

            let byte = match bytes.next() {
                Some(byte) => byte?,
                None => break,
            };
            read += 1;

            pending = Some(match pending {
                None => Code::from(byte),
                Some(prefix) => match dict.child(prefix, byte) {
                    Some(entry) => entry,
                    None => {
                        output.write_symbol(Symbol::DictRef(prefix))?;
                        references += 1;
                        dict.insert(prefix, byte)?;
                        Code::from(byte)
                    }
                },
            });
        }

        if let Some(entry) = pending {
            output.write_symbol(Symbol::DictRef(entry))?;
            references += 1;
        }

        debug!(
            "lzw: encoded {} bytes as {} references with {} resets",
            read, references, resets
        );
        Ok(())
    }

    fn decode_symbols(&self, input: &mut dyn SymbolReader, output: &mut dyn Write) -> Result<()> {
        let mut dict = Dictionary::new(self.max_entries)?;
        let mut sequence = Vec::new();
        let mut prev: Option<Code> = None;
        let mut written = 0u64;

        while let Some(symbol) = input.read_symbol()? {
            let entry = match symbol {
                Symbol::DictRef(entry) => entry,
                Symbol::Reset => {
                    trace!("lzw: reset after {} entries", dict.next_free());
                    dict.reset();
                    prev = None;
                    continue;
                }
                other => {
                    return Err(Error::UnexpectedSymbol {
                        algorithm: Lzw::NAME,
                        symbol: other,
                    })
                }
            };

            sequence.clear();
            match prev {
                // The entry the encoder defined right before using it: the previous sequence
                // followed by its own first byte.
                Some(prev) if entry == dict.next_free() => {
                    dict.reconstruct(prev, &mut sequence)?;
                    let first = sequence[0];
                    sequence.push(first);
                    dict.insert(prev, first)?;
                }
                _ => {
                    dict.reconstruct(entry, &mut sequence)?;
                    if let Some(prev) = prev {
                        dict.insert(prev, sequence[0])?;
                    }
                }
            }

            output.write_all(&sequence)?;
            written += sequence.len() as u64;
            prev = Some(entry);
        }

        output.flush()?;
        debug!("lzw: decoded {} bytes", written);
        Ok(())
    }
}
