use std::fmt;

use crate::config::WindowConfig;

/// One compression step: copy `length` bytes starting `offset` bytes back,
/// then emit `next_symbol`.
///
/// `offset == 0` (and therefore `length == 0`) is a pure literal. With
/// `length == 0` the offset copies nothing and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub offset: usize,
    pub length: usize,
    pub next_symbol: u8,
}

impl Token {
    pub fn literal(next_symbol: u8) -> Self {
        Self {
            offset: 0,
            length: 0,
            next_symbol,
        }
    }

    /// Number of output bytes this token produces.
    pub fn span(&self) -> usize {
        self.length + 1
    }

    /// Checks the token against the window it is meant for.
    ///
    /// # Errors
    /// Returns a short description of the first violated rule.
    pub fn validate(&self, config: &WindowConfig) -> Result<(), &'static str> {
        if self.offset > config.search_capacity {
            return Err("offset exceeds search window");
        }
        if self.length > config.max_match_length() {
            return Err("length not below lookahead window");
        }
        if self.length > 0 && self.offset == 0 {
            return Err("copy without offset");
        }
        Ok(())
    }
}

/// Text record form: `offset,length,next_symbol`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.offset, self.length, self.next_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_text_record() {
        let token = Token {
            offset: 2,
            length: 2,
            next_symbol: b'A',
        };
        assert_eq!(token.to_string(), "2,2,65");
        assert_eq!(Token::literal(0).to_string(), "0,0,0");
    }

    #[test]
    fn test_validate() {
        let config = WindowConfig::default();
        let token = |offset, length| Token {
            offset,
            length,
            next_symbol: 1,
        };
        assert!(Token::literal(b'x').validate(&config).is_ok());
        assert!(token(10, 3).validate(&config).is_ok());
        assert!(token(3, 0).validate(&config).is_ok());

        assert!(token(11, 1).validate(&config).is_err());
        assert!(token(11, 0).validate(&config).is_err());
        assert!(token(3, 4).validate(&config).is_err());
        assert!(token(0, 1).validate(&config).is_err());
    }
}
