//! Fixed-capacity search history and lookahead.
//!
//! ```text
//!       search region              lookahead region
//! +---+---+---+ ... +-----+    +---+---+ ... +-----+        input
//! | 0 | 1 | 2 |     | N-1 |    | 0 | 1 |     | M-1 |  <---  source
//! +---+---+---+ ... +-----+    +---+---+ ... +-----+
//! ```
//!
//! Slots hold `Option<u8>`; `None` means "no symbol here" (history not yet
//! filled, or input exhausted), so every byte value is legal input.

use std::collections::VecDeque;
use std::io;

use crate::config::WindowConfig;
use crate::io::ByteSource;

pub struct WindowBuffer {
    search: VecDeque<Option<u8>>,
    lookahead: VecDeque<Option<u8>>,
    source_drained: bool,
    symbols_consumed: u64,
}

impl WindowBuffer {
    /// Window for encoding: both regions present and empty.
    pub fn new(config: &WindowConfig) -> Self {
        Self {
            search: VecDeque::from(vec![None; config.search_capacity]),
            lookahead: VecDeque::from(vec![None; config.lookahead_capacity]),
            source_drained: false,
            symbols_consumed: 0,
        }
    }

    /// Window for decoding: search region only.
    pub fn history(config: &WindowConfig) -> Self {
        Self {
            search: VecDeque::from(vec![None; config.search_capacity]),
            lookahead: VecDeque::new(),
            source_drained: true,
            symbols_consumed: 0,
        }
    }

    pub fn search_capacity(&self) -> usize {
        self.search.len()
    }

    pub fn lookahead_capacity(&self) -> usize {
        self.lookahead.len()
    }

    pub fn search_at(&self, index: usize) -> Option<u8> {
        self.search.get(index).copied().flatten()
    }

    pub fn lookahead_at(&self, index: usize) -> Option<u8> {
        self.lookahead.get(index).copied().flatten()
    }

    /// Input bytes pulled from the source so far.
    pub fn symbols_consumed(&self) -> u64 {
        self.symbols_consumed
    }

    /// True once no real symbol is left to tokenize.
    pub fn is_exhausted(&self) -> bool {
        self.lookahead_at(0).is_none()
    }

    /// Drops the `k` oldest lookahead symbols and refills the right end from `source`.
    /// Slots past end of input stay `None`; the source is not read again once drained.
    pub fn refill_lookahead<S: ByteSource + ?Sized>(
        &mut self,
        k: usize,
        source: &mut S,
    ) -> io::Result<()> {
        let k = k.min(self.lookahead.len());
        self.lookahead.drain(..k);
        for _ in 0..k {
            let slot = if self.source_drained {
                None
            } else {
                source.next_byte()?
            };
            match slot {
                Some(_) => self.symbols_consumed += 1,
                None => self.source_drained = true,
            }
            self.lookahead.push_back(slot);
        }
        Ok(())
    }

    /// Moves `match_length + 1` tokenized symbols from the lookahead into the
    /// search region, then refills the lookahead by the same amount.
    pub fn advance<S: ByteSource + ?Sized>(
        &mut self,
        match_length: usize,
        source: &mut S,
    ) -> io::Result<()> {
        let step = (match_length + 1).min(self.lookahead.len());
        let moved: Vec<Option<u8>> = self.lookahead.iter().take(step).copied().collect();
        self.shift_left(moved);
        self.refill_lookahead(step, source)
    }

    /// Appends decoded symbols at the right end of the search region.
    pub fn push_symbols(&mut self, symbols: &[u8]) {
        self.shift_left(symbols.iter().copied().map(Some));
    }

    /// Length of the common run between `search[start..]` and the lookahead,
    /// bounded by the end of the search region and by `limit`.
    pub fn match_length_at(&self, start: usize, limit: usize) -> usize {
        let mut length = 0;
        while length < limit {
            match (self.search.get(start + length), self.lookahead.get(length)) {
                (Some(Some(a)), Some(Some(b))) if a == b => length += 1,
                _ => break,
            }
        }
        length
    }

    /// Copies `length` symbols starting `offset` back from the right end of
    /// the search region. `None` if the run leaves the region or touches
    /// unfilled slots.
    pub fn copy_run(&self, offset: usize, length: usize) -> Option<Vec<u8>> {
        if length == 0 {
            return Some(Vec::new());
        }
        if offset == 0 || offset > self.search.len() {
            return None;
        }
        let start = self.search.len() - offset;
        if start + length > self.search.len() {
            return None;
        }
        self.search.range(start..start + length).copied().collect()
    }

    fn shift_left<I>(&mut self, incoming: I)
    where
        I: IntoIterator<Item = Option<u8>>,
    {
        let capacity = self.search.len();
        if capacity == 0 {
            return;
        }
        for slot in incoming {
            self.search.pop_front();
            self.search.push_back(slot);
        }
        debug_assert_eq!(self.search.len(), capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn config(n: usize, m: usize) -> WindowConfig {
        WindowConfig::new(n, m).unwrap()
    }

    fn search_bytes(window: &WindowBuffer) -> Vec<Option<u8>> {
        (0..window.search_capacity()).map(|i| window.search_at(i)).collect()
    }

    #[test]
    fn test_new_window_is_empty() {
        let window = WindowBuffer::new(&config(10, 4));
        assert_eq!(window.search_capacity(), 10);
        assert_eq!(window.lookahead_capacity(), 4);
        assert!(window.is_exhausted());
        assert!(search_bytes(&window).iter().all(Option::is_none));
    }

    #[test]
    fn test_short_input_pads_lookahead() -> io::Result<()> {
        let mut source = Cursor::new(b"AB".to_vec());
        let mut window = WindowBuffer::new(&config(10, 4));
        window.refill_lookahead(4, &mut source)?;

        assert_eq!(window.lookahead_at(0), Some(b'A'));
        assert_eq!(window.lookahead_at(1), Some(b'B'));
        assert_eq!(window.lookahead_at(2), None);
        assert_eq!(window.lookahead_at(3), None);
        assert_eq!(window.symbols_consumed(), 2);
        assert!(!window.is_exhausted());
        Ok(())
    }

    #[test]
    fn test_advance_moves_symbols_into_search() -> io::Result<()> {
        let mut source = Cursor::new(b"ABCDEF".to_vec());
        let mut window = WindowBuffer::new(&config(4, 3));
        window.refill_lookahead(3, &mut source)?;

        window.advance(1, &mut source)?;
        assert_eq!(search_bytes(&window), vec![None, None, Some(b'A'), Some(b'B')]);
        assert_eq!(window.lookahead_at(0), Some(b'C'));
        assert_eq!(window.lookahead_at(2), Some(b'E'));

        window.advance(2, &mut source)?;
        assert_eq!(
            search_bytes(&window),
            vec![Some(b'B'), Some(b'C'), Some(b'D'), Some(b'E')]
        );
        assert_eq!(window.lookahead_at(0), Some(b'F'));
        assert_eq!(window.lookahead_at(1), None);
        assert_eq!(window.symbols_consumed(), 6);

        window.advance(0, &mut source)?;
        assert!(window.is_exhausted());
        Ok(())
    }

    #[test]
    fn test_zero_byte_is_a_real_symbol() -> io::Result<()> {
        let mut source = Cursor::new(vec![0u8, 0]);
        let mut window = WindowBuffer::new(&config(4, 4));
        window.refill_lookahead(4, &mut source)?;
        assert!(!window.is_exhausted());
        assert_eq!(window.lookahead_at(1), Some(0));
        assert_eq!(window.lookahead_at(2), None);
        Ok(())
    }

    #[test]
    fn test_match_length_stops_at_search_end_and_limit() -> io::Result<()> {
        let mut source = Cursor::new(b"ABAB".to_vec());
        let mut window = WindowBuffer::new(&config(4, 4));
        window.push_symbols(b"XXAB");
        window.refill_lookahead(4, &mut source)?;

        assert_eq!(window.match_length_at(2, 3), 2);
        assert_eq!(window.match_length_at(2, 1), 1);
        assert_eq!(window.match_length_at(0, 3), 0);
        Ok(())
    }

    #[test]
    fn test_copy_run_bounds() {
        let mut window = WindowBuffer::history(&config(5, 4));
        window.push_symbols(b"ABC");

        assert_eq!(window.copy_run(3, 2), Some(b"AB".to_vec()));
        assert_eq!(window.copy_run(1, 1), Some(b"C".to_vec()));
        assert_eq!(window.copy_run(0, 0), Some(Vec::new()));
        // unfilled history
        assert_eq!(window.copy_run(4, 1), None);
        // runs off the right end
        assert_eq!(window.copy_run(2, 3), None);
        assert_eq!(window.copy_run(6, 1), None);
        assert_eq!(window.copy_run(0, 1), None);
    }

    #[test]
    fn test_push_symbols_keeps_capacity() {
        let mut window = WindowBuffer::history(&config(3, 4));
        window.push_symbols(b"ABCDE");
        assert_eq!(search_bytes(&window), vec![Some(b'C'), Some(b'D'), Some(b'E')]);
    }
}
