use crate::domain::{Bytes, DataKey, ProviderError};
use crate::ports::{KeyValueReader, KeyValueWriter, Receipt};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

/// In-memory key/value store. Each batch is applied under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    data: RwLock<HashMap<DataKey, Bytes>>,
    unavailable: AtomicBool,
    batches_applied: AtomicU64,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value directly, bypassing batches (fixtures, corruption).
    pub fn insert_raw(&self, key: DataKey, value: Bytes) -> Result<(), ProviderError> {
        let mut data = self.data.write().map_err(|_| ProviderError::LockPoisoned)?;
        if value.is_empty() {
            data.remove(&key);
        } else {
            data.insert(key, value);
        }
        Ok(())
    }

    pub fn get(&self, key: &DataKey) -> Option<Bytes> {
        self.data.read().ok()?.get(key).cloned()
    }

    /// Number of non-empty keys.
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every call fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn batches_applied(&self) -> u64 {
        self.batches_applied.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::ConnectionError("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueReader for InMemoryKeyValueStore {
    async fn read(&self, key: DataKey) -> Result<Bytes, ProviderError> {
        self.check_available()?;
        let data = self.data.read().map_err(|_| ProviderError::LockPoisoned)?;
        Ok(data.get(&key).cloned().unwrap_or_default())
    }

    async fn read_batch(&self, keys: &[DataKey]) -> Result<Vec<Bytes>, ProviderError> {
        self.check_available()?;
        let data = self.data.read().map_err(|_| ProviderError::LockPoisoned)?;
        Ok(keys
            .iter()
            .map(|key| data.get(key).cloned().unwrap_or_default())
            .collect())
    }
}

#[async_trait]
impl KeyValueWriter for InMemoryKeyValueStore {
    async fn apply_batch(&self, keys: Vec<DataKey>, values: Vec<Bytes>) -> Result<Receipt, ProviderError> {
        self.check_available()?;
        if keys.len() != values.len() {
            return Err(ProviderError::BatchLengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let mut data = self.data.write().map_err(|_| ProviderError::LockPoisoned)?;
        let mut receipt = Receipt::default();
        for (key, value) in keys.into_iter().zip(values) {
            if value.is_empty() {
                data.remove(&key);
                receipt.keys_cleared += 1;
            } else {
                data.insert(key, value);
                receipt.keys_set += 1;
            }
        }
        self.batches_applied.fetch_add(1, Ordering::SeqCst);
        Ok(receipt)
    }
}
