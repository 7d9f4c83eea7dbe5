//! # UAP Test Suite
//!
//! Workspace-level tests driving [`uap_state`] through its public API only.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── mod.rs        # shared fixtures
//!     ├── flows.rs      # full assistant lifecycles against one store
//!     └── failures.rs   # provider failures and corrupted storage
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p uap-tests
//!
//! # with planner logs
//! RUST_LOG=uap_state=debug cargo test -p uap-tests -- --nocapture
//! ```

pub mod integration;
