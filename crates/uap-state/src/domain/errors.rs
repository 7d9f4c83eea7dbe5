//! # Error Types
//!
//! All error types for assistant configuration state handling.

use super::value_objects::{Address, TypeId};
use thiserror::Error;

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

/// Errors raised while deriving keys, decoding records or planning migrations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A stored value is shorter than its fixed prefix or otherwise invalid.
    #[error("malformed {record} record: {reason}")]
    MalformedRecord {
        record: &'static str,
        reason: String,
    },

    /// Screener sibling index is at or above the per-executive ceiling.
    #[error("screener capacity exceeded: sibling index {sibling_index} >= {max}")]
    CapacityExceeded { sibling_index: usize, max: usize },

    /// Key template could not be parsed or does not fit its parameters.
    #[error("invalid key template: {0}")]
    InvalidTemplate(String),

    /// Address string is not 20 bytes of hex.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Error from the key/value provider, passed through unmodified.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Transaction type is unknown to the catalog or flagged unsupported.
    #[error("unsupported transaction type: {0}")]
    UnsupportedTransactionType(TypeId),

    /// The same executive appears twice in one chain.
    #[error("duplicate executive in chain: {0}")]
    DuplicateExecutive(Address),

    /// Chain is longer than the configured maximum.
    #[error("too many executives: {count} > {max}")]
    TooManyExecutives { count: usize, max: usize },

    /// One list name was given two different address sets.
    #[error("conflicting contents for address list '{0}'")]
    ConflictingAddressList(String),

    /// One address listed twice in the same address list.
    #[error("address {address} listed twice in '{list}'")]
    DuplicateListEntry { list: String, address: Address },

    /// Address list longer than the configured maximum.
    #[error("address list '{list}' too long: {len} > {max}")]
    AddressListTooLong { list: String, len: usize, max: usize },

    /// Address-list screener configured without a list.
    #[error("screener {0} requires an address list")]
    MissingAddressList(Address),

    /// Assistant is not attached to the transaction type.
    #[error("assistant {assistant} not configured for type {type_id}")]
    AssistantNotFound { type_id: TypeId, assistant: Address },

    /// Requested position lies outside the chain.
    #[error("position {position} out of range for chain of length {len}")]
    PositionOutOfRange { position: usize, len: usize },

    /// Planner configuration failed validation.
    #[error("invalid planner config: {0}")]
    InvalidConfig(String),
}

impl ConfigError {
    pub(crate) fn malformed(record: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            record,
            reason: reason.into(),
        }
    }

    /// Returns true if this error only affects the single slot being decoded.
    #[must_use]
    pub fn is_slot_local(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}

// =============================================================================
// PROVIDER ERRORS
// =============================================================================

/// Errors from the external key/value read/write provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("timeout")]
    Timeout,

    #[error("batch rejected: {0}")]
    Rejected(String),

    #[error("keys/values length mismatch: {keys} keys, {values} values")]
    BatchLengthMismatch { keys: usize, values: usize },

    #[error("lock poisoned")]
    LockPoisoned,
}
