//! # UAP State - Universal Assistant Configuration Planner
//!
//! Reads, validates and migrates the assistant configuration a smart account
//! keeps in its generic `bytes32 -> bytes` key/value store. The crate never
//! writes on its own: it computes the minimal write batch and hands it to a
//! [`KeyValueWriter`](ports::KeyValueWriter) to apply atomically.
//!
//! ## Storage Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `UAPTypeConfig:<type>` | ABI `address[]` of executives |
//! | `UAPExecutiveConfig:<type>:<position>` | `executive(20) ‖ config` |
//! | `UAPExecutiveScreeners:<type>:<position>` | ABI `address[]` of screeners |
//! | `UAPExecutiveScreenersANDLogic:<type>:<position>` | `0x01` AND, `0x00` OR |
//! | `UAPScreenerConfig:<type>:<order>` | `executive(20) ‖ screener(20) ‖ config` |
//! | `UAPAddressListName:<type>:<order>` | ABI `string` |
//! | `<name>[]` | address list (`uint128` length, raw elements, reverse map) |
//!
//! `order = position * 1000 + sibling`, so an executive holds at most 1000
//! screeners.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Key derivation | `domain/keys.rs` | LSP2 singleton/mapping/grouping/array keys |
//! | Codec | `domain/codec.rs` | Record and ABI value encodings |
//! | Target builder | `domain/target.rs` | Desired chain to state model |
//! | Diff engine | `domain/diff.rs` | Minimal write batch between two models |
//! | Configuration reader | `service/config_reader.rs` | One assistant's attachment |
//! | State analyzer | `service/analyzer.rs` | Full snapshot of a type |
//! | Service | `service/assistant_service.rs` | Plan and apply migrations |
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use uap_state::prelude::*;
//!
//! let service = AssistantConfigService::new(store, catalog, PlannerConfig::from_env())?;
//! let outcome = service
//!     .remove_assistant(type_id, assistant)
//!     .await?;
//! println!("{} writes", outcome.plan.batch.len());
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Value objects and errors
    pub use crate::domain::errors::{ConfigError, ProviderError};
    pub use crate::domain::value_objects::{Address, Bytes, DataKey, TypeId};

    // Desired and reconstructed configuration
    pub use crate::domain::entities::{
        AddressListSpec, AssistantAttachment, CombineLogic, ExecutiveSpec, ScreenerAttachment,
        ScreenerSpec,
    };
    pub use crate::domain::screener_config::{ScreenerConfig, ScreenerKind};

    // Planning
    pub use crate::domain::config::PlannerConfig;
    pub use crate::domain::diff::diff_states;
    pub use crate::domain::model::{DataWrite, Slot, StateModel, WriteBatch, WriteTarget};
    pub use crate::domain::target::TargetBuilder;

    // Ports and adapters
    pub use crate::adapters::{InMemoryKeyValueStore, StaticTypeCatalog};
    pub use crate::ports::{
        KeyValueReader, KeyValueStore, KeyValueWriter, Receipt, TransactionTypeCatalog,
        TransactionTypeInfo,
    };

    // Services
    pub use crate::service::{
        AddressListManager, AssistantConfigService, ConfigurationReader, MigrationOutcome,
        MigrationPlan, ServiceStats, StateAnalyzer,
    };
}
