//! Governance plugin cache node.
//!
//! The node mirrors the authoritative record store's governance plugin
//! tables:
//! - Record versions pushed by the authoritative store are mirrored
//! - Write-through commands are replayed into the local tables
//! - Read-only commands are answered from them
//! - Vote results are materialized once a vote ends
//! - The tables are rebuilt from the plugin inventory on version mismatch

pub mod config;
pub mod convert;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod node;
pub mod rebuild;
pub mod records;
pub mod tracing_spans;

pub use config::CacheConfig;
pub use dispatcher::Dispatcher;
pub use error::{CacheError, StoreContext};
pub use govcache_store_lmdb::LmdbEnvironment;
pub use govcache_utils::{init_logging, LogFormat};
pub use metrics::CacheMetrics;
pub use node::CacheNode;
pub use rebuild::RebuildController;
pub use records::RecordMirror;
