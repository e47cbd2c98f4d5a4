use std::io::Cursor;

use tracing::{debug, trace};

use crate::codec::TokenSink;
use crate::config::WindowConfig;
use crate::error::Result;
use crate::io::ByteSource;
use crate::matcher::find_best_match;
use crate::token::Token;
use crate::window::WindowBuffer;

/// Totals for one encoder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    pub symbols_consumed: u64,
    pub tokens: u64,
}

pub struct Encoder {
    config: WindowConfig,
}

impl Encoder {
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    /// Tokenizes everything `source` yields into `sink`.
    ///
    /// Each iteration emits one token and moves `length + 1` real symbols from
    /// the lookahead into history, so an input of `L` bytes yields at most `L`
    /// tokens. The sink is finished once the lookahead runs dry.
    ///
    /// # Errors
    /// Returns an error if the source or the sink fails; nothing is retried.
    pub fn encode<S, T>(&self, source: &mut S, sink: &mut T) -> Result<EncodeStats>
    where
        S: ByteSource + ?Sized,
        T: TokenSink + ?Sized,
    {
        self.config.validate()?;

        let mut window = WindowBuffer::new(&self.config);
        window.refill_lookahead(self.config.lookahead_capacity, source)?;

        let mut stats = EncodeStats::default();
        while let Some(token) = find_best_match(&window) {
            trace!(
                offset = token.offset,
                length = token.length,
                next_symbol = token.next_symbol,
                "token"
            );
            sink.put(token)?;
            stats.tokens += 1;
            window.advance(token.length, source)?;
        }
        sink.finish()?;

        stats.symbols_consumed = window.symbols_consumed();
        debug!(
            symbols = stats.symbols_consumed,
            tokens = stats.tokens,
            "encoding finished"
        );
        Ok(stats)
    }
}

/// Encodes an in-memory buffer.
pub fn encode_bytes(input: &[u8], config: WindowConfig) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    Encoder::new(config).encode(&mut Cursor::new(input), &mut tokens)?;
    Ok(tokens)
}
