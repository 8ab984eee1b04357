//! A compact binary wire format.
//!
//! A stream starts with a header: the four magic bytes `0x89 'L' 'Z' 'S'`, a version byte, the
//! length of the algorithm name as one byte and the name itself in UTF-8.
//!
//! The body is a bit stream, most significant bit first. Every symbol starts with a two-bit tag:
//!
//! | tag  | symbol              | payload                        |
//! |------|---------------------|--------------------------------|
//! | `00` | literal             | 8 bits                         |
//! | `01` | back-reference      | distance, then length          |
//! | `10` | dictionary reference| entry                          |
//! | `11` | control             | 1 bit: `0` reset, `1` end      |
//!
//! Numbers are stored as a 6-bit width `w` followed by the value in `w` bits. The end marker is
//! padded with zero bits to a full byte.
use std::io::{self, BufRead, Write};

use crate::codec::{SymbolReader, SymbolWriter};
use crate::error::{Error, Result};
use crate::Symbol;

/// The first bytes of every packed stream.
pub const MAGIC: [u8; 4] = [0x89, b'L', b'Z', b'S'];
/// The version of the format written by this crate.
pub const VERSION: u8 = 1;

const FORMAT: &str = "packed";

const TAG_LITERAL: u32 = 0b00;
const TAG_BACKREF: u32 = 0b01;
const TAG_DICTREF: u32 = 0b10;
const TAG_CONTROL: u32 = 0b11;
const TAG_BITS: u8 = 2;
const WIDTH_BITS: u8 = 6;
/// Pending output is handed to the sink in chunks of about this size.
const CHUNK: usize = 1 << 12;

/// Writes symbols in the packed format.
pub struct PackedWriter<W: Write> {
    inner: W,
    bits: BitWriter,
    started: bool,
    finished: bool,
}

/// Reads symbols in the packed format.
pub struct PackedReader<R: BufRead> {
    inner: R,
    algorithm: String,
    bits: BitReader,
    ended: bool,
}

/// Collects bit fields into bytes, most significant bit first.
struct BitWriter {
    /// The buffer bits, aligned to the top.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
    /// Completed bytes not yet written.
    bytes: Vec<u8>,
}

/// Splits bytes into bit fields, most significant bit first.
struct BitReader {
    /// The buffer bits, aligned to the top.
    bit_buffer: u64,
    /// The number of valid buffer bits.
    bits: u8,
}

impl<W: Write> PackedWriter<W> {
    pub fn new(inner: W) -> Self {
        PackedWriter {
            inner,
            bits: BitWriter::new(),
            started: false,
            finished: false,
        }
    }

    /// Unwrap the sink. Anything not finished is lost.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn check_open(&self) -> Result<()> {
        if !self.started {
            return Err(Error::AlgorithmNotSet);
        }
        if self.finished {
            return Err(Error::malformed(FORMAT, "stream already finished"));
        }
        Ok(())
    }

    fn write_number(&mut self, value: u32) {
        let width = 32 - value.leading_zeros();
        self.bits.buffer_bits(width, WIDTH_BITS);
        self.bits.buffer_bits(value, width as u8);
    }

    fn drain(&mut self, all: bool) -> Result<()> {
        if all || self.bits.bytes.len() >= CHUNK {
            self.inner.write_all(&self.bits.bytes)?;
            self.bits.bytes.clear();
        }
        Ok(())
    }
}

impl<W: Write> SymbolWriter for PackedWriter<W> {
    fn set_algorithm(&mut self, name: &str) -> Result<()> {
        if self.started {
            return Err(Error::InvalidConfig("algorithm already set".into()));
        }
        let len = u8::try_from(name.len()).map_err(|_| {
            Error::InvalidConfig(format!("algorithm name of {} bytes is too long", name.len()))
        })?;

        self.inner.write_all(&MAGIC)?;
        self.inner.write_all(&[VERSION, len])?;
        self.inner.write_all(name.as_bytes())?;
        self.started = true;
        Ok(())
    }

    fn write_symbol(&mut self, symbol: Symbol) -> Result<()> {
        self.check_open()?;
        match symbol {
            Symbol::Literal(byte) => {
                self.bits.buffer_bits(TAG_LITERAL, TAG_BITS);
                self.bits.buffer_bits(u32::from(byte), 8);
            }
            Symbol::BackRef { distance, length } => {
                self.bits.buffer_bits(TAG_BACKREF, TAG_BITS);
                self.write_number(distance);
                self.write_number(length);
            }
            Symbol::DictRef(entry) => {
                self.bits.buffer_bits(TAG_DICTREF, TAG_BITS);
                self.write_number(entry);
            }
            Symbol::Reset => {
                self.bits.buffer_bits(TAG_CONTROL, TAG_BITS);
                self.bits.buffer_bits(0, 1);
            }
        }
        self.drain(false)
    }

    fn finish(&mut self) -> Result<()> {
        self.check_open()?;
        self.bits.buffer_bits(TAG_CONTROL, TAG_BITS);
        self.bits.buffer_bits(1, 1);
        self.bits.buffer_pad();
        self.bits.flush_out();
        self.finished = true;
        self.drain(true)?;
        self.inner.flush()?;
        Ok(())
    }
}

impl<R: BufRead> PackedReader<R> {
    /// Read the header of a packed stream.
    pub fn new(mut inner: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        inner.read_exact(&mut magic).map_err(truncated)?;
        if magic != MAGIC {
            return Err(Error::malformed(FORMAT, "bad magic bytes"));
        }

        let mut fields = [0u8; 2];
        inner.read_exact(&mut fields).map_err(truncated)?;
        let [version, len] = fields;
        if version != VERSION {
            return Err(Error::malformed(
                FORMAT,
                format!("unsupported version {}", version),
            ));
        }

        let mut name = vec![0u8; usize::from(len)];
        inner.read_exact(&mut name).map_err(truncated)?;
        let algorithm = String::from_utf8(name)
            .map_err(|_| Error::malformed(FORMAT, "algorithm name is not UTF-8"))?;

        Ok(PackedReader {
            inner,
            algorithm,
            bits: BitReader::new(),
            ended: false,
        })
    }

    fn get_bits(&mut self, count: u8) -> Result<u32> {
        loop {
            if let Some(value) = self.bits.get_bits(count) {
                return Ok(value);
            }
            if !self.bits.refill_bits(&mut self.inner)? {
                return Err(Error::malformed(FORMAT, "stream ends without an end marker"));
            }
        }
    }

    fn read_number(&mut self) -> Result<u32> {
        let width = self.get_bits(WIDTH_BITS)?;
        if width > 32 {
            return Err(Error::malformed(
                FORMAT,
                format!("number of {} bits does not fit", width),
            ));
        }
        self.get_bits(width as u8)
    }
}

impl<R: BufRead> SymbolReader for PackedReader<R> {
    fn algorithm(&self) -> Option<&str> {
        Some(&self.algorithm)
    }

    fn read_symbol(&mut self) -> Result<Option<Symbol>> {
        if self.ended {
            return Ok(None);
        }

        let symbol = match self.get_bits(TAG_BITS)? {
            TAG_LITERAL => Symbol::Literal(self.get_bits(8)? as u8),
            TAG_BACKREF => {
                let distance = self.read_number()?;
                let length = self.read_number()?;
                Symbol::BackRef { distance, length }
            }
            TAG_DICTREF => Symbol::DictRef(self.read_number()?),
            _ => {
                if self.get_bits(1)? == 0 {
                    Symbol::Reset
                } else {
                    self.ended = true;
                    return Ok(None);
                }
            }
        };

        Ok(Some(symbol))
    }
}

fn truncated(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::malformed(FORMAT, "truncated header")
    } else {
        err.into()
    }
}

impl BitWriter {
    fn new() -> Self {
        BitWriter {
            buffer: 0,
            bits_in_buffer: 0,
            bytes: Vec::with_capacity(CHUNK + 8),
        }
    }

    /// Insert the low `count` bits of `value`, at most 32.
    fn buffer_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32);
        debug_assert!(count == 32 || value >> count == 0);
        if count == 0 {
            return;
        }
        if self.bits_in_buffer + count > 64 {
            self.flush_out();
        }

        let shift = 64 - self.bits_in_buffer - count;
        self.buffer |= u64::from(value) << shift;
        self.bits_in_buffer += count;
    }

    /// Move all full bytes to the output.
    fn flush_out(&mut self) {
        while self.bits_in_buffer >= 8 {
            self.bytes.push(((self.buffer & 0xff00_0000_0000_0000) >> 56) as u8);
            self.buffer <<= 8;
            self.bits_in_buffer -= 8;
        }
    }

    /// Pad the buffer to a full byte.
    fn buffer_pad(&mut self) {
        let to_byte = self.bits_in_buffer.wrapping_neg() & 0x7;
        self.bits_in_buffer += to_byte;
    }
}

impl BitReader {
    fn new() -> Self {
        BitReader {
            bit_buffer: 0,
            bits: 0,
        }
    }

    /// Top up the buffer from `inp`, returning whether any byte was available.
    fn refill_bits(&mut self, inp: &mut impl BufRead) -> Result<bool> {
        let wish_count = usize::from((64 - self.bits) / 8);
        if wish_count == 0 {
            return Ok(true);
        }

        let available = inp.fill_buf()?;
        let count = wish_count.min(available.len());
        let mut buffer = [0u8; 8];
        buffer[..count].copy_from_slice(&available[..count]);
        inp.consume(count);

        self.bit_buffer |= u64::from_be_bytes(buffer) >> self.bits;
        self.bits += (count * 8) as u8;
        Ok(count > 0)
    }

    fn get_bits(&mut self, count: u8) -> Option<u32> {
        if self.bits < count {
            return None;
        }
        if count == 0 {
            return Some(0);
        }

        let mask = (1u64 << count) - 1;
        let rotbuf = self.bit_buffer.rotate_left(count.into());
        self.bit_buffer = rotbuf & !mask;
        self.bits -= count;
        Some((rotbuf & mask) as u32)
    }
}
