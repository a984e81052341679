//! Abstract storage traits for the governance cache.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! Two stores live side by side: the versioned [`RecordStore`] mirroring
//! the authoritative record store, and the [`PluginStore`] holding the
//! governance plugin tables. Writes to plugin tables go through a
//! [`PluginBatch`]; dropping a batch without committing rolls it back.

pub mod error;
pub mod keys;
pub mod meta;
pub mod plugin;
pub mod record;
pub mod rows;

pub use error::StoreError;
pub use meta::VersionRecord;
pub use plugin::{PluginBatch, PluginStore, PLUGIN_TABLES};
pub use record::{File, InventoryStats, MetadataStream, Record, RecordStore};
pub use rows::{
    AuthorizeVoteRow, CastVoteRow, CommentLikeRow, CommentRow, StartVoteRow, VoteOptionResultRow,
    VoteOptionRow, VoteResultsRow,
};

/// A backend that holds both the record mirror and the plugin tables.
pub trait CacheStore: RecordStore + PluginStore {}

impl<T: RecordStore + PluginStore> CacheStore for T {}
