//! Planner configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use uap_state::domain::PlannerConfig;
//!
//! let config = PlannerConfig::default()
//!     .with_max_executives(32)
//!     .with_read_batch_size(16);
//! config.validate()?;
//! ```

use super::errors::ConfigError;
use super::order::MAX_SCREENERS_PER_EXECUTIVE;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Limits applied while snapshotting and building configurations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum executives per transaction type
    pub max_executives: usize,
    /// Maximum screeners per executive (never above the order ceiling)
    pub max_screeners_per_executive: usize,
    /// Keys per `read_batch` call while snapshotting
    pub read_batch_size: usize,
    /// Longest address list written or read back
    pub max_address_list_len: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_executives: 256,
            max_screeners_per_executive: MAX_SCREENERS_PER_EXECUTIVE,
            read_batch_size: 64,
            max_address_list_len: 1024,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_screeners_per_executive > MAX_SCREENERS_PER_EXECUTIVE {
            return Err(ConfigError::InvalidConfig(format!(
                "max_screeners_per_executive {} exceeds order ceiling {}",
                self.max_screeners_per_executive, MAX_SCREENERS_PER_EXECUTIVE
            )));
        }

        if self.max_executives == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_executives cannot be 0".to_string(),
            ));
        }

        if self.max_address_list_len == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_address_list_len cannot be 0".to_string(),
            ));
        }

        if self.read_batch_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "read_batch_size cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_max_executives(mut self, max: usize) -> Self {
        self.max_executives = max;
        self
    }

    pub fn with_max_screeners(mut self, max: usize) -> Self {
        self.max_screeners_per_executive = max;
        self
    }

    pub fn with_read_batch_size(mut self, size: usize) -> Self {
        self.read_batch_size = size;
        self
    }

    pub fn with_max_address_list_len(mut self, max: usize) -> Self {
        self.max_address_list_len = max;
        self
    }

    /// Defaults overridden by `UAP_MAX_EXECUTIVES`, `UAP_MAX_SCREENERS` and
    /// `UAP_READ_BATCH_SIZE`. Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let overrides: [(&str, &mut usize); 3] = [
            ("UAP_MAX_EXECUTIVES", &mut config.max_executives),
            ("UAP_MAX_SCREENERS", &mut config.max_screeners_per_executive),
            ("UAP_READ_BATCH_SIZE", &mut config.read_batch_size),
        ];
        for (name, field) in overrides {
            if let Some(raw) = lookup(name) {
                match raw.parse() {
                    Ok(value) => *field = value,
                    Err(_) => warn!(variable = name, value = %raw, "Ignoring non-numeric override"),
                }
            }
        }
        config
    }
}
