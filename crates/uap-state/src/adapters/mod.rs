//! # Adapters
//!
//! In-memory implementations of the outbound ports for tests and local
//! tooling. Production adapters talk to a node over RPC.

pub mod memory_store;
pub mod static_catalog;

pub use memory_store::*;
pub use static_catalog::*;
