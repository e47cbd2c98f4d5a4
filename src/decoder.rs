use tracing::{debug, trace};

use crate::codec::TokenSource;
use crate::config::WindowConfig;
use crate::error::{Error, Result};
use crate::io::ByteSink;
use crate::token::Token;
use crate::window::WindowBuffer;

/// Totals for one decoder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub tokens: u64,
    pub bytes_written: u64,
}

pub struct Decoder {
    config: WindowConfig,
}

impl Decoder {
    /// The configuration must match the one the tokens were encoded with.
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    /// Replays `tokens` in order, writing the reconstructed bytes to `sink`.
    ///
    /// # Errors
    /// Stops at the first token that breaks the window invariants or copies
    /// from history that does not exist yet. Bytes of earlier tokens have
    /// already been written by then.
    pub fn decode<T, W>(&self, tokens: &mut T, sink: &mut W) -> Result<DecodeStats>
    where
        T: TokenSource + ?Sized,
        W: ByteSink + ?Sized,
    {
        self.config.validate()?;

        let mut window = WindowBuffer::history(&self.config);
        let mut stats = DecodeStats::default();
        while let Some(token) = tokens.next_token()? {
            let index = stats.tokens;
            token
                .validate(&self.config)
                .map_err(|reason| Error::InvalidToken { index, reason })?;

            let mut run = window
                .copy_run(token.offset, token.length)
                .ok_or(Error::CorruptReference {
                    index,
                    offset: token.offset,
                    length: token.length,
                })?;
            run.push(token.next_symbol);
            trace!(index, offset = token.offset, length = token.length, "token resolved");

            sink.write_bytes(&run)?;
            window.push_symbols(&run);
            stats.tokens += 1;
            stats.bytes_written += token.span() as u64;
        }

        debug!(
            tokens = stats.tokens,
            bytes = stats.bytes_written,
            "decoding finished"
        );
        Ok(stats)
    }
}

/// Decodes an in-memory token sequence.
pub fn decode_tokens(tokens: &[Token], config: WindowConfig) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    Decoder::new(config).decode(&mut tokens.iter(), &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_bytes;

    fn small() -> WindowConfig {
        WindowConfig::new(10, 4).unwrap()
    }

    #[test]
    fn test_decode_known_tokens() -> Result<()> {
        let tokens = [
            Token::literal(b'A'),
            Token::literal(b'B'),
            Token { offset: 2, length: 2, next_symbol: b'A' },
            Token { offset: 4, length: 2, next_symbol: b'B' },
        ];
        assert_eq!(decode_tokens(&tokens, small())?, b"ABABABAB");
        Ok(())
    }

    #[test]
    fn test_empty_token_stream() -> Result<()> {
        assert!(decode_tokens(&[], small())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_roundtrip_small_inputs() -> Result<()> {
        for input in [
            &b""[..],
            &b"A"[..],
            &b"AB"[..],
            &b"AAAAAAAAAAAAAAAAAAAA"[..],
            &b"ABABABAB"[..],
            &b"\0\0\0\0\0\0"[..],
            &b"mississippi river, mississippi state"[..],
        ] {
            let tokens = encode_bytes(input, small())?;
            assert_eq!(decode_tokens(&tokens, small())?, input);
        }
        Ok(())
    }

    #[test]
    fn test_reference_into_unfilled_history_fails() {
        let tokens = [
            Token::literal(b'A'),
            Token { offset: 3, length: 1, next_symbol: b'B' },
        ];
        let mut output = Vec::new();
        let err = Decoder::new(small())
            .decode(&mut tokens.iter(), &mut output)
            .unwrap_err();
        assert!(matches!(err, Error::CorruptReference { index: 1, offset: 3, length: 1 }));
        // the first token was already emitted
        assert_eq!(output, b"A");
    }

    #[test]
    fn test_copy_past_history_end_fails() {
        let tokens = [
            Token::literal(b'A'),
            Token::literal(b'B'),
            Token { offset: 1, length: 2, next_symbol: b'C' },
        ];
        let err = decode_tokens(&tokens, small()).unwrap_err();
        assert!(matches!(err, Error::CorruptReference { index: 2, .. }));
    }

    #[test]
    fn test_out_of_range_token_fails() {
        let err = decode_tokens(&[Token { offset: 11, length: 1, next_symbol: 0 }], small())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidToken { index: 0, .. }));

        let err = decode_tokens(&[Token { offset: 1, length: 4, next_symbol: 0 }], small())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidToken { index: 0, .. }));
    }

    #[test]
    fn test_offset_without_length_is_a_literal() -> Result<()> {
        let tokens = [
            Token::literal(b'A'),
            Token { offset: 1, length: 0, next_symbol: b'B' },
            Token { offset: 3, length: 0, next_symbol: b'C' },
        ];
        assert_eq!(decode_tokens(&tokens, small())?, b"ABC");
        Ok(())
    }
}
