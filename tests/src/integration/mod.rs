//! # Integration Tests
//!
//! Shared fixtures for the flows below. Everything goes through the public
//! `uap_state` API with the in-memory adapters, or with [`FlakyStore`] when a
//! provider failure is needed mid-operation.

pub mod failures;
pub mod flows;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uap_state::prelude::*;

static TRACING: Once = Once::new();

/// Install a test subscriber once; filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "uap_state=warn".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

pub fn addr(byte: u8) -> Address {
    Address::new([byte; 20])
}

/// `LSP7Tokens_Transfer`
pub fn token_transfer() -> TypeId {
    TypeId::new([0x7A; 32])
}

/// `LSP0ValueReceived`
pub fn value_received() -> TypeId {
    TypeId::new([0x9C; 32])
}

pub fn catalog() -> Arc<StaticTypeCatalog> {
    Arc::new(
        StaticTypeCatalog::new()
            .with_type(token_transfer(), "LSP7Tokens_Transfer")
            .with_type(value_received(), "LSP0ValueReceived"),
    )
}

pub fn service_over<S: KeyValueStore>(store: Arc<S>) -> AssistantConfigService<S, StaticTypeCatalog> {
    init_tracing();
    AssistantConfigService::new(store, catalog(), PlannerConfig::default().with_read_batch_size(4))
        .expect("valid planner config")
}

/// Store wrapper whose reads start failing after a budget is spent and whose
/// writes can be rejected.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: InMemoryKeyValueStore,
    reads_left: AtomicUsize,
    limit_reads: AtomicBool,
    reject_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `reads` more key reads, then time out.
    pub fn fail_reads_after(&self, reads: usize) {
        self.reads_left.store(reads, Ordering::SeqCst);
        self.limit_reads.store(true, Ordering::SeqCst);
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.limit_reads.store(false, Ordering::SeqCst);
        self.reject_writes.store(false, Ordering::SeqCst);
    }

    fn spend_read(&self) -> Result<(), ProviderError> {
        if !self.limit_reads.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.reads_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .map(|_| ())
            .map_err(|_| ProviderError::Timeout)
    }
}

#[async_trait]
impl KeyValueReader for FlakyStore {
    async fn read(&self, key: DataKey) -> Result<Bytes, ProviderError> {
        self.spend_read()?;
        self.inner.read(key).await
    }
}

#[async_trait]
impl KeyValueWriter for FlakyStore {
    async fn apply_batch(&self, keys: Vec<DataKey>, values: Vec<Bytes>) -> Result<Receipt, ProviderError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(ProviderError::Rejected("execution reverted".to_string()));
        }
        self.inner.apply_batch(keys, values).await
    }
}
