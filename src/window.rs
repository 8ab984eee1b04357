//! The sliding window behind LZ77.
//!
//! A [`SlidingWindow`] keeps the most recent bytes of a logically unbounded stream in a fixed
//! circular array. It is bound to exactly one direction at construction:
//!
//!  * a window over a [`Source`] pulls bytes from a reader, keeps look-ahead for match search and
//!    indexes every offset behind the cursor by its 3-byte prefix. Compression uses this mode.
//!  * a window over a [`Sink`] records every byte written to a writer so that back-references can
//!    be replayed from its history. Decompression uses this mode.
//!
//! All positions are logical stream offsets. They are mapped to physical slots by the ring
//! helpers only, which is the one place that knows about the modular layout.
use core::ops::Range;
use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::{DEFAULT_MAX_DISTANCE, DEFAULT_MAX_LENGTH, MAX_DISTANCE_LIMIT, MAX_LENGTH_LIMIT, MIN_MATCH};

/// Bits of the 3-byte prefix hash.
const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const HASH_MASK: usize = HASH_SIZE - 1;
/// The number of bytes hashed for each indexed offset.
const KEY_LENGTH: u64 = MIN_MATCH as u64;
/// How many candidates a match search looks at by default.
pub const DEFAULT_MAX_CHAIN: usize = 4096;
/// The largest buffer a reading window accepts.
pub const MAX_BUFFER_LEN: usize = 1 << 26;

/// Size parameters of a sliding window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// The largest distance a back-reference may span.
    pub max_distance: u32,
    /// The longest match that will be searched for or replayed.
    pub max_length: u32,
    /// The preferred physical buffer length when reading.
    ///
    /// It is raised to `max_distance + max_length + 1` when smaller, and ignored when writing.
    pub buffer_len: usize,
    /// The number of earlier positions a single match search examines at most.
    pub max_chain: usize,
}

/// The result of a successful match search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    /// How many bytes behind the cursor the match starts.
    pub distance: u32,
    /// How many bytes match.
    pub length: u32,
}

/// A window reading from an upstream source.
pub struct Source<R> {
    inner: R,
    eof: bool,
    index: PositionIndex,
    /// Offsets below this one are in the index.
    indexed: u64,
    /// Chain links followed by all searches so far.
    #[cfg(test)]
    hops: u64,
}

/// A window writing to a downstream sink.
pub struct Sink<W> {
    inner: W,
    /// Bytes of the current replay, forwarded to the sink in one go.
    scratch: Vec<u8>,
}

/// A fixed-capacity window over a byte stream, see the module documentation.
pub struct SlidingWindow<M> {
    ring: Ring,
    max_distance: u32,
    max_length: u32,
    max_chain: usize,
    mode: M,
}

/// Circular storage addressed by logical offsets.
///
/// Holds the bytes of offsets `bottom..top`. `position` is the cursor with
/// `bottom <= position <= top`, and `top - bottom < capacity` so one slot always stays free.
struct Ring {
    bytes: Box<[u8]>,
    bottom: u64,
    position: u64,
    top: u64,
}

/// Hash chains of offsets behind the cursor, newest first.
///
/// Offsets are indexed once the cursor has passed them, so a chain never holds look-ahead.
/// Links are stored per physical slot and hold `offset + 1`, with `0` ending a chain. Offsets
/// that fell out of the window are not removed; a search stops at the first one that is too far.
struct PositionIndex {
    heads: Box<[u64]>,
    links: Box<[u64]>,
}

impl WindowConfig {
    /// The configuration used by default: 32 KiB of history and matches of up to 258 bytes.
    pub const fn new() -> Self {
        WindowConfig {
            max_distance: DEFAULT_MAX_DISTANCE,
            max_length: DEFAULT_MAX_LENGTH,
            buffer_len: 2 * DEFAULT_MAX_DISTANCE as usize,
            max_chain: DEFAULT_MAX_CHAIN,
        }
    }

    /// Change the maximum back-reference distance.
    pub fn with_max_distance(self, max_distance: u32) -> Self {
        WindowConfig { max_distance, ..self }
    }

    /// Change the maximum match length.
    pub fn with_max_length(self, max_length: u32) -> Self {
        WindowConfig { max_length, ..self }
    }

    /// Change the preferred buffer length of reading windows.
    pub fn with_buffer_len(self, buffer_len: usize) -> Self {
        WindowConfig { buffer_len, ..self }
    }

    /// Change how many candidates a match search examines.
    pub fn with_max_chain(self, max_chain: usize) -> Self {
        WindowConfig { max_chain, ..self }
    }

    /// Check that a window can be built with these parameters.
    pub fn validate(&self) -> Result<()> {
        if self.max_distance < 1 {
            return Err(Error::InvalidConfig("maximum distance must be at least 1".into()));
        }
        if self.max_length < MIN_MATCH {
            return Err(Error::InvalidConfig(format!(
                "maximum length must be at least {}",
                MIN_MATCH
            )));
        }
        if self.max_chain < 1 {
            return Err(Error::InvalidConfig("match search needs at least one candidate".into()));
        }
        if self.max_distance > MAX_DISTANCE_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "maximum distance must be at most {}, got {}",
                MAX_DISTANCE_LIMIT, self.max_distance
            )));
        }
        if self.max_length > MAX_LENGTH_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "maximum length must be at most {}, got {}",
                MAX_LENGTH_LIMIT, self.max_length
            )));
        }
        if self.buffer_len > MAX_BUFFER_LEN {
            return Err(Error::InvalidConfig(format!(
                "buffer length must be at most {}, got {}",
                MAX_BUFFER_LEN, self.buffer_len
            )));
        }
        Ok(())
    }

    fn write_capacity(&self) -> usize {
        self.max_distance as usize + self.max_length as usize + 1
    }

    fn read_capacity(&self) -> usize {
        self.buffer_len.max(self.write_capacity())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig::new()
    }
}

impl<R: Read> SlidingWindow<Source<R>> {
    /// A window reading from `inner` with the default configuration.
    pub fn reader(inner: R) -> Self {
        Self::build_reader(inner, WindowConfig::new())
    }

    /// A window reading from `inner` with a custom configuration.
    pub fn reader_with(inner: R, config: WindowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build_reader(inner, config))
    }

    fn build_reader(inner: R, config: WindowConfig) -> Self {
        let capacity = config.read_capacity();
        SlidingWindow {
            ring: Ring::new(capacity),
            max_distance: config.max_distance,
            max_length: config.max_length,
            max_chain: config.max_chain,
            mode: Source {
                inner,
                eof: false,
                index: PositionIndex::new(capacity),
                indexed: 0,
                #[cfg(test)]
                hops: 0,
            },
        }
    }

    /// Read up to `dest.len()` bytes, pulling from the source as needed.
    ///
    /// Returns `0` only when nothing is pending and the source is exhausted.
    pub fn read(&mut self, dest: &mut [u8]) -> Result<usize> {
        let len = dest.len();
        self.consume(Some(dest), len)
    }

    /// Advance the cursor by up to `len` bytes, like `read` without a destination.
    pub fn skip(&mut self, len: usize) -> Result<usize> {
        self.consume(None, len)
    }

    /// Search the history for the longest match of the bytes at the cursor.
    ///
    /// Candidates share the 3-byte prefix at the cursor and are tried nearest first; only a
    /// strictly longer match replaces the current best, so ties go to the smallest distance.
    /// At most `max_chain` candidates are examined.
    /// Returns `None` when no candidate within `max_distance` matches at least 3 bytes.
    pub fn find_past_match(&mut self) -> Result<Option<Match>> {
        self.fill()?;
        if self.ring.ahead() < KEY_LENGTH {
            return Ok(None);
        }
        self.index_history();

        let position = self.ring.position;
        let hash = self.ring.prefix_hash(position);
        let mut best: Option<Match> = None;
        let mut candidate = self.mode.index.head(hash);
        let mut remaining = self.max_chain;
        while let Some(offset) = candidate {
            debug_assert!(offset < position);
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            #[cfg(test)]
            {
                self.mode.hops += 1;
            }

            let distance = position - offset;
            if distance > u64::from(self.max_distance) {
                break;
            }

            let length = self.match_length(distance);
            if length >= MIN_MATCH && best.map_or(true, |best| best.length < length) {
                best = Some(Match {
                    distance: distance as u32,
                    length,
                });
                if length == self.max_length {
                    break;
                }
            }

            candidate = self.mode.index.next(self.ring.slot(offset));
        }

        Ok(best)
    }

    /// Whether the source is exhausted and every buffered byte has been consumed.
    pub fn is_drained(&self) -> bool {
        self.mode.eof && self.ring.ahead() == 0
    }

    /// The logical offset of the cursor.
    pub fn position(&self) -> u64 {
        self.ring.position
    }

    fn consume(&mut self, mut dest: Option<&mut [u8]>, len: usize) -> Result<usize> {
        let mut done = 0;
        while done < len {
            self.fill()?;
            let ahead = self.ring.ahead() as usize;
            if ahead == 0 {
                break;
            }

            let run = self.ring.contiguous(self.ring.position, (len - done).min(ahead));
            let count = run.len();
            if let Some(dest) = dest.as_deref_mut() {
                dest[done..done + count].copy_from_slice(&self.ring.bytes[run]);
            }
            self.ring.position += count as u64;
            done += count;
        }

        Ok(done)
    }

    /// Discard old history and refill from the source once the look-ahead runs short.
    fn fill(&mut self) -> Result<()> {
        if self.mode.eof || self.ring.ahead() > u64::from(self.max_length) {
            return Ok(());
        }

        self.ring.discard_behind(u64::from(self.max_distance));
        while self.ring.free() > 0 && !self.mode.eof {
            let run = self.ring.contiguous(self.ring.top, self.ring.free());
            let read = match self.mode.inner.read(&mut self.ring.bytes[run]) {
                Ok(0) => {
                    self.mode.eof = true;
                    break;
                }
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };

            self.ring.top += read as u64;
        }

        Ok(())
    }

    /// Index the retained offsets the cursor has passed since the last search.
    ///
    /// Needs 3 bytes of look-ahead, so that every key behind the cursor is complete.
    fn index_history(&mut self) {
        let first = self.mode.indexed.max(self.ring.bottom);
        for offset in first..self.ring.position {
            let hash = self.ring.prefix_hash(offset);
            let slot = self.ring.slot(offset);
            self.mode.index.insert(hash, slot, offset);
        }
        self.mode.indexed = self.ring.position;
    }

    /// The number of bytes at the cursor matching those `distance` bytes earlier.
    fn match_length(&self, distance: u64) -> u32 {
        let position = self.ring.position;
        let limit = self.ring.ahead().min(u64::from(self.max_length));
        let mut length = 0;
        while length < limit
            && self.ring.at(position - distance + length) == self.ring.at(position + length)
        {
            length += 1;
        }
        length as u32
    }
}

impl<W: Write> SlidingWindow<Sink<W>> {
    /// A window writing into `inner` with the default configuration.
    pub fn writer(inner: W) -> Self {
        Self::build_writer(inner, WindowConfig::new())
    }

    /// A window writing into `inner` with a custom configuration.
    pub fn writer_with(inner: W, config: WindowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build_writer(inner, config))
    }

    fn build_writer(inner: W, config: WindowConfig) -> Self {
        SlidingWindow {
            ring: Ring::new(config.write_capacity()),
            max_distance: config.max_distance,
            max_length: config.max_length,
            max_chain: config.max_chain,
            mode: Sink {
                inner,
                scratch: Vec::with_capacity(config.max_length as usize),
            },
        }
    }

    /// Write one byte to the sink and into the history.
    pub fn write(&mut self, byte: u8) -> Result<()> {
        self.record(byte);
        self.mode.inner.write_all(&[byte])?;
        Ok(())
    }

    /// Write all bytes to the sink and into the history.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.record(byte);
        }
        self.mode.inner.write_all(bytes)?;
        Ok(())
    }

    /// Emit `length` bytes again, starting `distance` bytes behind the cursor.
    ///
    /// Bytes are copied one at a time so a match may overlap the bytes it produces.
    pub fn repeat_past_match(&mut self, distance: u32, length: u32) -> Result<()> {
        let history = self.ring.behind().min(u64::from(self.max_distance)) as u32;
        if distance < 1 || distance > history {
            return Err(Error::InvalidDistance {
                distance,
                max: history,
            });
        }
        if length < MIN_MATCH || length > self.max_length {
            return Err(Error::InvalidLength {
                length,
                min: MIN_MATCH,
                max: self.max_length,
            });
        }

        let mut scratch = core::mem::take(&mut self.mode.scratch);
        scratch.clear();
        for _ in 0..length {
            let byte = self.ring.at(self.ring.position - u64::from(distance));
            self.record(byte);
            scratch.push(byte);
        }
        let result = self.mode.inner.write_all(&scratch);
        self.mode.scratch = scratch;
        Ok(result?)
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.mode.inner.flush()?;
        Ok(())
    }

    /// The logical offset of the cursor, equal to the number of bytes written.
    pub fn position(&self) -> u64 {
        self.ring.position
    }

    /// Unwrap the sink.
    pub fn into_inner(self) -> W {
        self.mode.inner
    }

    fn record(&mut self, byte: u8) {
        self.ring.discard_behind(u64::from(self.max_distance));
        let position = self.ring.position;
        self.ring.set(position, byte);
        self.ring.position += 1;
        self.ring.top = self.ring.position;
    }
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Ring {
            bytes: vec![0; capacity].into_boxed_slice(),
            bottom: 0,
            position: 0,
            top: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// The physical slot of a logical offset.
    fn slot(&self, offset: u64) -> usize {
        (offset % self.capacity() as u64) as usize
    }

    /// Retained history behind the cursor.
    fn behind(&self) -> u64 {
        self.position - self.bottom
    }

    /// Buffered look-ahead at the cursor.
    fn ahead(&self) -> u64 {
        self.top - self.position
    }

    /// Slots that can be filled without overwriting retained bytes.
    fn free(&self) -> usize {
        self.capacity() - 1 - (self.top - self.bottom) as usize
    }

    /// Forget bytes more than `max_distance` behind the cursor, never any closer ones.
    fn discard_behind(&mut self, max_distance: u64) {
        if self.behind() > max_distance {
            self.bottom = self.position - max_distance;
        }
    }

    /// The slots of at most `len` consecutive offsets from `offset` that do not wrap around.
    fn contiguous(&self, offset: u64, len: usize) -> Range<usize> {
        let start = self.slot(offset);
        start..start + len.min(self.capacity() - start)
    }

    fn at(&self, offset: u64) -> u8 {
        debug_assert!(self.bottom <= offset && offset < self.top);
        self.bytes[self.slot(offset)]
    }

    fn set(&mut self, offset: u64, byte: u8) {
        let slot = self.slot(offset);
        self.bytes[slot] = byte;
    }

    /// The hash of the 3 bytes at `offset`, which must all be buffered.
    fn prefix_hash(&self, offset: u64) -> usize {
        prefix_hash(self.at(offset), self.at(offset + 1), self.at(offset + 2))
    }
}

fn prefix_hash(a: u8, b: u8, c: u8) -> usize {
    ((usize::from(a) << (2 * HASH_BITS / 3)) ^ (usize::from(b) << (HASH_BITS / 3)) ^ usize::from(c))
        & HASH_MASK
}

impl PositionIndex {
    fn new(capacity: usize) -> Self {
        PositionIndex {
            heads: vec![0; HASH_SIZE].into_boxed_slice(),
            links: vec![0; capacity].into_boxed_slice(),
        }
    }

    fn insert(&mut self, hash: usize, slot: usize, offset: u64) {
        self.links[slot] = self.heads[hash];
        self.heads[hash] = offset + 1;
    }

    fn head(&self, hash: usize) -> Option<u64> {
        self.heads[hash].checked_sub(1)
    }

    fn next(&self, slot: usize) -> Option<u64> {
        self.links[slot].checked_sub(1)
    }
}
