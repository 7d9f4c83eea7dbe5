//! # Order Arithmetic
//!
//! Screener slots are addressed by a single integer derived from the parent
//! executive's position and the screener's sibling index. Each executive owns
//! the range `[position * 1000, position * 1000 + 999]`, so ranges of adjacent
//! executives never overlap.

use super::errors::ConfigError;

/// Maximum screeners attached to one executive position.
pub const MAX_SCREENERS_PER_EXECUTIVE: usize = 1000;

/// Storage order of the `sibling`-th screener of the executive at `position`.
pub fn screener_order(position: usize, sibling: usize) -> Result<u64, ConfigError> {
    if sibling >= MAX_SCREENERS_PER_EXECUTIVE {
        return Err(ConfigError::CapacityExceeded {
            sibling_index: sibling,
            max: MAX_SCREENERS_PER_EXECUTIVE,
        });
    }
    (position as u64)
        .checked_mul(MAX_SCREENERS_PER_EXECUTIVE as u64)
        .and_then(|base| base.checked_add(sibling as u64))
        .ok_or(ConfigError::CapacityExceeded {
            sibling_index: sibling,
            max: MAX_SCREENERS_PER_EXECUTIVE,
        })
}

/// Split a screener order back into `(position, sibling)`.
#[must_use]
pub fn split_screener_order(order: u64) -> (usize, usize) {
    let per = MAX_SCREENERS_PER_EXECUTIVE as u64;
    ((order / per) as usize, (order % per) as usize)
}
