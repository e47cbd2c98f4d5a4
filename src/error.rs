use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Invalid window configuration: {0}")]
    InvalidConfig(String),

    // Token stream errors
    #[error("Malformed token record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Token {index} is invalid: {reason}")]
    InvalidToken { index: u64, reason: &'static str },

    #[error("Token {index} copies {length} bytes from offset {offset} outside the filled history")]
    CorruptReference {
        index: u64,
        offset: usize,
        length: usize,
    },

    // Framing errors
    #[error("Cannot detect token framing from first byte 0x{0:02x}")]
    UnknownFraming(u8),

    #[error("Invalid binary token stream magic byte: 0x{0:02x}")]
    InvalidMagic(u8),

    #[error("Binary token stream header truncated: expected {expected} bytes, found {found}")]
    TruncatedHeader { expected: usize, found: usize },

    #[error("Token stream truncated: expected {expected} tokens, found {found}")]
    Truncated { expected: u64, found: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
