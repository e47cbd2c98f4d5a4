//! Token framings.
//!
//! Text: one token per line, `offset,length,next_symbol` in decimal.
//! Binary: magic byte, window sizes, token count, then fixed 9-byte records.

use std::io::{BufRead, ErrorKind, Read, Write};

use tracing::debug;

use crate::config::WindowConfig;
use crate::error::{Error, Result};
use crate::token::Token;

pub const BINARY_MAGIC: u8 = 0x4C;
/// Shortest valid text record, `0,0,0`. Shorter lines end the stream.
const MIN_RECORD_LEN: usize = 5;
const BINARY_HEADER_LEN: usize = 17;
const BINARY_RECORD_LEN: usize = 9;

/// Ordered destination for tokens.
pub trait TokenSink {
    fn put(&mut self, token: Token) -> Result<()>;

    /// Called once after the last token.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Ordered origin of tokens. `Ok(None)` ends the stream.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Option<Token>>;
}

impl TokenSink for Vec<Token> {
    fn put(&mut self, token: Token) -> Result<()> {
        self.push(token);
        Ok(())
    }
}

impl TokenSource for std::slice::Iter<'_, Token> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        Ok(self.next().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Framing {
    Text,
    Binary,
}

/// Detect the framing by peeking at the first byte. Empty input is an empty text stream.
pub fn detect_framing(reader: &mut dyn BufRead) -> Result<Framing> {
    let first_byte = reader.fill_buf()?.first().copied();
    match first_byte {
        Some(BINARY_MAGIC) => Ok(Framing::Binary),
        Some(b) if b.is_ascii_digit() => Ok(Framing::Text),
        Some(b) => Err(Error::UnknownFraming(b)),
        None => Ok(Framing::Text),
    }
}

pub struct TextTokenWriter<W: Write> {
    inner: W,
}

impl<W: Write> TextTokenWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> TokenSink for TextTokenWriter<W> {
    fn put(&mut self, token: Token) -> Result<()> {
        writeln!(self.inner, "{}", token)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

pub struct TextTokenReader<R: BufRead> {
    inner: R,
    line: usize,
    buf: String,
    done: bool,
}

impl<R: BufRead> TextTokenReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            buf: String::new(),
            done: false,
        }
    }
}

impl<R: BufRead> TokenSource for TextTokenReader<R> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        if self.done {
            return Ok(None);
        }
        self.buf.clear();
        self.line += 1;
        let record = match self.inner.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(self.buf.trim_end_matches(['\r', '\n'])),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(Error::MalformedRecord {
                    line: self.line,
                    reason: "not valid UTF-8".to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        match record {
            Some(record) if record.len() >= MIN_RECORD_LEN => {
                parse_record(record, self.line).map(Some)
            }
            _ => {
                debug!(lines = self.line - 1, "text token stream ended");
                self.done = true;
                Ok(None)
            }
        }
    }
}

fn parse_record(record: &str, line: usize) -> Result<Token> {
    let malformed = |reason: String| Error::MalformedRecord { line, reason };

    let fields: Vec<&str> = record.split(',').collect();
    if fields.len() != 3 {
        return Err(malformed(format!("expected 3 fields, found {}", fields.len())));
    }
    let field = |index: usize, name: &str| {
        fields[index]
            .trim()
            .parse::<usize>()
            .map_err(|e| malformed(format!("bad {} '{}': {}", name, fields[index], e)))
    };
    let offset = field(0, "offset")?;
    let length = field(1, "length")?;
    let symbol = field(2, "next symbol")?;
    let next_symbol = u8::try_from(symbol)
        .map_err(|_| malformed(format!("next symbol {} is not a byte", symbol)))?;

    Ok(Token {
        offset,
        length,
        next_symbol,
    })
}

/// Buffers tokens and writes the whole binary stream on `finish`,
/// since the header carries the token count.
pub struct BinaryTokenWriter<W: Write> {
    inner: W,
    config: WindowConfig,
    tokens: Vec<Token>,
    finished: bool,
}

impl<W: Write> BinaryTokenWriter<W> {
    pub fn new(inner: W, config: WindowConfig) -> Self {
        Self {
            inner,
            config,
            tokens: Vec::new(),
            finished: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> TokenSink for BinaryTokenWriter<W> {
    fn put(&mut self, token: Token) -> Result<()> {
        if self.finished {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::Other,
                "token written after binary stream was finished",
            )));
        }
        self.tokens.push(token);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        let mut out = Vec::with_capacity(BINARY_HEADER_LEN + self.tokens.len() * BINARY_RECORD_LEN);
        out.push(BINARY_MAGIC);
        out.extend_from_slice(&to_u32(self.config.search_capacity)?.to_le_bytes());
        out.extend_from_slice(&to_u32(self.config.lookahead_capacity)?.to_le_bytes());
        out.extend_from_slice(&(self.tokens.len() as u64).to_le_bytes());
        for token in self.tokens.drain(..) {
            out.extend_from_slice(&to_u32(token.offset)?.to_le_bytes());
            out.extend_from_slice(&to_u32(token.length)?.to_le_bytes());
            out.push(token.next_symbol);
        }
        self.inner.write_all(&out)?;
        self.inner.flush()?;
        self.finished = true;
        Ok(())
    }
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::InvalidConfig(format!("value {} does not fit a binary record", value)))
}

pub struct BinaryTokenReader<R: Read> {
    inner: R,
    config: WindowConfig,
    expected: u64,
    found: u64,
}

impl<R: Read> BinaryTokenReader<R> {
    /// Reads and validates the stream header.
    pub fn open(mut inner: R) -> Result<Self> {
        let mut magic = [0u8; 1];
        read_header_field(&mut inner, &mut magic, 0)?;
        if magic[0] != BINARY_MAGIC {
            return Err(Error::InvalidMagic(magic[0]));
        }
        let mut word = [0u8; 4];
        read_header_field(&mut inner, &mut word, 1)?;
        let search_capacity = u32::from_le_bytes(word) as usize;
        read_header_field(&mut inner, &mut word, 5)?;
        let lookahead_capacity = u32::from_le_bytes(word) as usize;
        let mut count = [0u8; 8];
        read_header_field(&mut inner, &mut count, 9)?;

        let config = WindowConfig::new(search_capacity, lookahead_capacity)?;
        let expected = u64::from_le_bytes(count);
        debug!(search_capacity, lookahead_capacity, expected, "binary token stream opened");
        Ok(Self {
            inner,
            config,
            expected,
            found: 0,
        })
    }

    /// Window sizes recorded by the encoder.
    pub fn config(&self) -> WindowConfig {
        self.config
    }

    pub fn token_count(&self) -> u64 {
        self.expected
    }
}

fn read_header_field<R: Read>(inner: &mut R, buf: &mut [u8], offset: usize) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match inner.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Error::TruncatedHeader {
                    expected: BINARY_HEADER_LEN,
                    found: offset + filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(())
}

impl<R: Read> TokenSource for BinaryTokenReader<R> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        if self.found == self.expected {
            return Ok(None);
        }
        let mut record = [0u8; BINARY_RECORD_LEN];
        match self.inner.read_exact(&mut record) {
            Ok(()) => {}
            Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(Error::Truncated {
                    expected: self.expected,
                    found: self.found,
                });
            }
            Err(e) => return Err(Error::Io(e)),
        }
        self.found += 1;
        Ok(Some(Token {
            offset: u32::from_le_bytes([record[0], record[1], record[2], record[3]]) as usize,
            length: u32::from_le_bytes([record[4], record[5], record[6], record[7]]) as usize,
            next_symbol: record[8],
        }))
    }
}
