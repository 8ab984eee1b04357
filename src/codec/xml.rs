//! A readable XML wire format.
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <compressedData algorithm="lz77">
//!   <byte value="97"/>
//!   <reference distance="4" length="3"/>
//!   <dictionary entry="257"/>
//!   <reset/>
//! </compressedData>
//! ```
//!
//! The reader understands the subset of XML this writer produces, plus comments, processing
//! instructions and arbitrary whitespace between elements.
use std::borrow::Cow;
use std::io::{BufRead, BufWriter, Write};
use std::str::FromStr;

use crate::codec::{SymbolReader, SymbolWriter};
use crate::error::{Error, Result};
use crate::Symbol;

const FORMAT: &str = "xml";
const ROOT: &str = "compressedData";

/// Writes symbols as XML elements.
pub struct XmlWriter<W: Write> {
    inner: BufWriter<W>,
    started: bool,
    finished: bool,
}

/// Reads symbols from XML elements.
pub struct XmlReader<R: BufRead> {
    inner: R,
    algorithm: Option<String>,
    ended: bool,
    raw: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq)]
enum TagKind {
    /// `<name ...>`
    Start,
    /// `<name .../>`
    Empty,
    /// `</name>`
    End,
}

#[derive(Debug)]
struct Tag {
    name: String,
    attributes: Vec<(String, String)>,
    kind: TagKind,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(inner: W) -> Self {
        XmlWriter {
            inner: BufWriter::new(inner),
            started: false,
            finished: false,
        }
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
}

impl<W: Write> SymbolWriter for XmlWriter<W> {
    fn set_algorithm(&mut self, name: &str) -> Result<()> {
        if self.started {
            return Err(Error::InvalidConfig("algorithm already set".into()));
        }
        write!(
            self.inner,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<{} algorithm=\"{}\">\n",
            ROOT,
            escape(name)
        )?;
        self.started = true;
        Ok(())
    }

    fn write_symbol(&mut self, symbol: Symbol) -> Result<()> {
        self.check_open()?;
        match symbol {
            Symbol::Literal(byte) => writeln!(self.inner, "  <byte value=\"{}\"/>", byte)?,
            Symbol::BackRef { distance, length } => writeln!(
                self.inner,
                "  <reference distance=\"{}\" length=\"{}\"/>",
                distance, length
            )?,
            Symbol::DictRef(entry) => writeln!(self.inner, "  <dictionary entry=\"{}\"/>", entry)?,
            Symbol::Reset => writeln!(self.inner, "  <reset/>")?,
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.check_open()?;
        writeln!(self.inner, "</{}>", ROOT)?;
        self.finished = true;
        self.inner.flush()?;
        Ok(())
    }
}

impl<R: BufRead> XmlReader<R> {
    /// Read up to and including the root element.
    pub fn new(inner: R) -> Result<Self> {
        let mut reader = XmlReader {
            inner,
            algorithm: None,
            ended: false,
            raw: Vec::new(),
        };

        let root = reader
            .next_tag()?
            .ok_or_else(|| Error::malformed(FORMAT, "no root element"))?;
        if root.name != ROOT || root.kind == TagKind::End {
            return Err(Error::malformed(
                FORMAT,
                format!("expected <{}>, found <{}>", ROOT, root.name),
            ));
        }
        reader.algorithm = root.attribute("algorithm").map(str::to_owned);
        reader.ended = root.kind == TagKind::Empty;
        Ok(reader)
    }

    /// The next tag, skipping declarations, comments and whitespace.
    fn next_tag(&mut self) -> Result<Option<Tag>> {
        loop {
            self.raw.clear();
            if self.inner.read_until(b'<', &mut self.raw)? == 0 {
                return Ok(None);
            }
            let opened = self.raw.last() == Some(&b'<');
            let text = if opened {
                &self.raw[..self.raw.len() - 1]
            } else {
                &self.raw[..]
            };
            if !text.iter().all(u8::is_ascii_whitespace) {
                return Err(Error::malformed(FORMAT, "unexpected text between elements"));
            }
            if !opened {
                return Ok(None);
            }

            self.raw.clear();
            // Comments and declarations are skipped whole, so quotes in them mean nothing.
            let markup = self.inner.fill_buf()?.first() == Some(&b'!');
            self.read_tag_body(!markup)?;
            if self.raw.starts_with(b"!--") {
                while self.raw.len() < 5 || !self.raw.ends_with(b"--") {
                    self.raw.push(b'>');
                    self.read_tag_body(false)?;
                }
                continue;
            }
            if self.raw.starts_with(b"?") || self.raw.starts_with(b"!") {
                continue;
            }

            let body = std::str::from_utf8(&self.raw)
                .map_err(|_| Error::malformed(FORMAT, "tag is not UTF-8"))?;
            return Tag::parse(body).map(Some);
        }
    }

    /// Append everything up to the next `>` to the raw buffer, without the `>`.
    ///
    /// With `quoted`, a `>` inside a quoted attribute value does not end the tag.
    fn read_tag_body(&mut self, quoted: bool) -> Result<()> {
        let mut quote = None;
        loop {
            let available = self.inner.fill_buf()?;
            if available.is_empty() {
                return Err(Error::malformed(FORMAT, "unterminated tag"));
            }

            let mut end = None;
            for (i, &byte) in available.iter().enumerate() {
                match quote {
                    Some(open) if byte == open => quote = None,
                    Some(_) => {}
                    None if quoted && (byte == b'"' || byte == b'\'') => quote = Some(byte),
                    None if byte == b'>' => {
                        end = Some(i);
                        break;
                    }
                    None => {}
                }
            }

            let used = match end {
                Some(i) => {
                    self.raw.extend_from_slice(&available[..i]);
                    i + 1
                }
                None => {
                    self.raw.extend_from_slice(available);
                    available.len()
                }
            };
            self.inner.consume(used);
            if end.is_some() {
                return Ok(());
            }
        }
    }
}

impl<R: BufRead> SymbolReader for XmlReader<R> {
    fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    fn read_symbol(&mut self) -> Result<Option<Symbol>> {
        if self.ended {
            return Ok(None);
        }

        let tag = self
            .next_tag()?
            .ok_or_else(|| Error::malformed(FORMAT, format!("missing </{}>", ROOT)))?;
        if tag.kind == TagKind::End {
            if tag.name != ROOT {
                return Err(Error::malformed(FORMAT, format!("unbalanced </{}>", tag.name)));
            }
            self.ended = true;
            return Ok(None);
        }

        let symbol = match tag.name.as_str() {
            "byte" => Symbol::Literal(tag.number("value")?),
            "reference" => Symbol::BackRef {
                distance: tag.number("distance")?,
                length: tag.number("length")?,
            },
            "dictionary" => Symbol::DictRef(tag.number("entry")?),
            "reset" => Symbol::Reset,
            other => {
                return Err(Error::malformed(FORMAT, format!("unknown element <{}>", other)))
            }
        };

        if tag.kind == TagKind::Start {
            // Only an immediately closed element is allowed.
            match self.next_tag()? {
                Some(end) if end.kind == TagKind::End && end.name == tag.name => {}
                _ => {
                    return Err(Error::malformed(
                        FORMAT,
                        format!("<{}> must be empty", tag.name),
                    ))
                }
            }
        }

        Ok(Some(symbol))
    }
}

impl Tag {
    fn parse(body: &str) -> Result<Self> {
        let (kind, body) = if let Some(rest) = body.strip_prefix('/') {
            (TagKind::End, rest)
        } else if let Some(rest) = body.strip_suffix('/') {
            (TagKind::Empty, rest)
        } else {
            (TagKind::Start, body)
        };

        let body = body.trim();
        let name_end = body
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(body.len());
        let (name, mut rest) = body.split_at(name_end);
        if name.is_empty() {
            return Err(Error::malformed(FORMAT, "element without a name"));
        }

        let mut attributes = Vec::new();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            let eq = rest
                .find('=')
                .ok_or_else(|| Error::malformed(FORMAT, format!("bad attribute in <{}>", name)))?;
            let key = rest[..eq].trim();
            rest = rest[eq + 1..].trim_start();
            let quote = match rest.chars().next() {
                Some(quote @ '"') | Some(quote @ '\'') => quote,
                _ => {
                    return Err(Error::malformed(
                        FORMAT,
                        format!("unquoted attribute {} in <{}>", key, name),
                    ))
                }
            };
            rest = &rest[1..];
            let close = rest.find(quote).ok_or_else(|| {
                Error::malformed(FORMAT, format!("unterminated attribute {} in <{}>", key, name))
            })?;
            attributes.push((key.to_owned(), unescape(&rest[..close])?.into_owned()));
            rest = &rest[close + 1..];
        }

        Ok(Tag {
            name: name.to_owned(),
            attributes,
            kind,
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn number<T: FromStr>(&self, key: &str) -> Result<T> {
        let value = self.attribute(key).ok_or_else(|| {
            Error::malformed(FORMAT, format!("<{}> lacks attribute {}", self.name, key))
        })?;
        value.trim().parse().map_err(|_| {
            Error::malformed(
                FORMAT,
                format!("attribute {}={:?} of <{}> is out of range", key, value, self.name),
            )
        })
    }
}

fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn unescape(text: &str) -> Result<Cow<'_, str>> {
    if !text.contains('&') {
        return Ok(Cow::Borrowed(text));
    }

    let mut unescaped = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        unescaped.push_str(&rest[..amp]);
        rest = &rest[amp + 1..];
        let semi = rest
            .find(';')
            .ok_or_else(|| Error::malformed(FORMAT, "unterminated entity"))?;
        let entity = &rest[..semi];
        let c = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => entity
                .strip_prefix("#x")
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(u32::from_str))
                .and_then(|code| code.ok())
                .and_then(char::from_u32)
                .ok_or_else(|| Error::malformed(FORMAT, format!("unknown entity &{};", entity)))?,
        };
        unescaped.push(c);
        rest = &rest[semi + 1..];
    }
    unescaped.push_str(rest);
    Ok(Cow::Owned(unescaped))
}
