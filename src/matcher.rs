use crate::token::Token;
use crate::window::WindowBuffer;

/// Finds the longest run of the lookahead that also occurs in the search region.
///
/// Candidates are scanned from the oldest slot to the newest and only a strictly
/// longer run replaces the current best, so equal lengths keep the furthest match.
/// If the winning run reaches end of input or the end of the lookahead it is
/// shortened by one, so `next_symbol` is always a real input byte.
pub fn find_best_match(window: &WindowBuffer) -> Option<Token> {
    let first = window.lookahead_at(0)?;
    let limit = window.lookahead_capacity();
    let capacity = window.search_capacity();

    let mut best = Token::literal(first);
    for start in 0..capacity {
        if window.search_at(start) != Some(first) {
            continue;
        }
        let size = window.match_length_at(start, limit);
        if size > best.length {
            best.offset = capacity - start;
            best.length = size;
        }
    }

    if best.length > 0 && window.lookahead_at(best.length).is_none() {
        best.length -= 1;
        if best.length == 0 {
            best.offset = 0;
        }
    }
    best.next_symbol = window.lookahead_at(best.length)?;
    Some(best)
}
