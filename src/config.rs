use crate::error::{Error, Result};

/// Search window length used when nothing else is configured.
pub const DEFAULT_SEARCH_CAPACITY: usize = 10;
/// Lookahead window length used when nothing else is configured.
pub const DEFAULT_LOOKAHEAD_CAPACITY: usize = 4;
/// Upper bound for either window so offsets and lengths fit a 32-bit record.
pub const MAX_CAPACITY: usize = 1 << 24;

/// Sizes of the two window regions shared by an encoder and its decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Search region length (N)
    pub search_capacity: usize,
    /// Lookahead region length (M)
    pub lookahead_capacity: usize,
}

impl WindowConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if either capacity is zero or above `MAX_CAPACITY`.
    pub fn new(search_capacity: usize, lookahead_capacity: usize) -> Result<Self> {
        let config = Self {
            search_capacity,
            lookahead_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_capacity("search", self.search_capacity)?;
        check_capacity("lookahead", self.lookahead_capacity)
    }

    /// Longest run a single token may copy.
    pub fn max_match_length(&self) -> usize {
        self.lookahead_capacity - 1
    }
}

fn check_capacity(region: &str, capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::InvalidConfig(format!("{} capacity must be at least 1", region)));
    }
    if capacity > MAX_CAPACITY {
        return Err(Error::InvalidConfig(format!(
            "{} capacity {} exceeds maximum {}",
            region, capacity, MAX_CAPACITY
        )));
    }
    Ok(())
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            search_capacity: DEFAULT_SEARCH_CAPACITY,
            lookahead_capacity: DEFAULT_LOOKAHEAD_CAPACITY,
        }
    }
}
