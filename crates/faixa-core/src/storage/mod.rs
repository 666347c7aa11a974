//! # Persistent Storage
//!
//! Disk-backed implementation of the graduation store.

mod redb_registry;

pub use redb_registry::RedbRegistry;
