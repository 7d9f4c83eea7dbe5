//! # Key/Value Provider Ports
//!
//! The account's generic `bytes32 -> bytes` store. Adapters implementing
//! these traits own transport, timeouts and retries; the core performs none.

use crate::domain::{Bytes, DataKey, ProviderError, WriteBatch};
use async_trait::async_trait;

/// Outcome of an applied batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Keys given a new value.
    pub keys_set: usize,
    /// Keys cleared.
    pub keys_cleared: usize,
}

/// Read access to the key/value store.
#[async_trait]
pub trait KeyValueReader: Send + Sync {
    /// Read one key. Unset keys return empty bytes, never an error.
    async fn read(&self, key: DataKey) -> Result<Bytes, ProviderError>;

    /// Read several keys; results are positional.
    async fn read_batch(&self, keys: &[DataKey]) -> Result<Vec<Bytes>, ProviderError> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.read(*key).await?);
        }
        Ok(values)
    }
}

/// Atomic multi-key write access to the key/value store.
#[async_trait]
pub trait KeyValueWriter: Send + Sync {
    /// Apply all writes or none. A zero-length value at index `i` clears
    /// `keys[i]`.
    async fn apply_batch(&self, keys: Vec<DataKey>, values: Vec<Bytes>) -> Result<Receipt, ProviderError>;

    /// Apply a computed [`WriteBatch`].
    async fn apply(&self, batch: &WriteBatch) -> Result<Receipt, ProviderError> {
        let (keys, values) = batch.to_parts();
        self.apply_batch(keys, values).await
    }
}

/// A store offering both halves.
pub trait KeyValueStore: KeyValueReader + KeyValueWriter {}

impl<T: KeyValueReader + KeyValueWriter> KeyValueStore for T {}
