//! Sliding-window LZ77 token encoder and decoder.
//!
//! The encoder turns a byte stream into `(offset, length, next_symbol)` tokens
//! that reference a bounded search window; the decoder replays them to rebuild
//! the exact input.
//!
//! ```
//! use slidezip::{decode_tokens, encode_bytes, WindowConfig};
//!
//! let config = WindowConfig::default();
//! let tokens = encode_bytes(b"ABABABAB", config).unwrap();
//! assert_eq!(decode_tokens(&tokens, config).unwrap(), b"ABABABAB");
//! ```

pub mod codec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod io;
pub mod matcher;
pub mod token;
pub mod window;

pub use codec::{
    detect_framing, BinaryTokenReader, BinaryTokenWriter, Framing, TextTokenReader,
    TextTokenWriter, TokenSink, TokenSource,
};
pub use config::WindowConfig;
pub use decoder::{decode_tokens, DecodeStats, Decoder};
pub use encoder::{encode_bytes, EncodeStats, Encoder};
pub use error::{Error, Result};
pub use io::{ByteSink, ByteSource};
pub use token::Token;
pub use window::WindowBuffer;
