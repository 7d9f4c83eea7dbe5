//! # Ports
//!
//! - `storage`: key/value read and atomic batch write provider
//! - `catalog`: external transaction type catalog

pub mod catalog;
pub mod storage;

pub use catalog::*;
pub use storage::*;
