//! Storage subsystem
//!
//! This module provides the storage contract consumed by the route layer and
//! the in-memory engine behind it.
//!
//! Components:
//! - `storage_trait`: the Storage trait defining a uniform API.
//! - `types`: entity records and insert/update inputs.
//! - `memory_storage`: process-local implementation with per-collection id counters.
//! - `account_filter`: helpers to build account queries.
//! - `demo_accounts`: sample profiles used to seed a fresh store.

pub mod account_filter;
pub mod demo_accounts;
pub mod memory_storage;
pub mod storage_trait;
pub mod types;

pub use memory_storage::MemStorage;
pub use storage_trait::Storage;
