//! Nullable infrastructure for deterministic testing.
//!
//! Provides an in-memory implementation of every storage trait that never
//! touches the filesystem. Each store is an explicit context object built
//! fresh per test; there is no process-wide state.

pub mod store;

pub use store::{NullBatch, NullCacheStore};
