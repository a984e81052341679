//! The cache node: wires storage, record mirror, dispatcher and rebuild
//! controller.

use std::sync::Arc;

use tracing::{info, warn};

use govcache_messages::InventoryReply;
use govcache_store::{CacheStore, StoreError};
use govcache_store_lmdb::LmdbEnvironment;

use crate::config::CacheConfig;
use crate::dispatcher::Dispatcher;
use crate::error::CacheError;
use crate::metrics::CacheMetrics;
use crate::rebuild::RebuildController;
use crate::records::RecordMirror;

/// A running governance cache.
pub struct CacheNode<S> {
    pub config: CacheConfig,
    pub store: Arc<S>,
    pub metrics: Arc<CacheMetrics>,
    pub dispatcher: Dispatcher<S>,
    pub rebuild: RebuildController<S>,
    pub records: RecordMirror<S>,
}

impl CacheNode<LmdbEnvironment> {
    /// Open (or create) the LMDB environment under `config.data_dir` and
    /// make sure the plugin tables exist.
    pub fn open(config: CacheConfig) -> Result<Self, CacheError> {
        let store = LmdbEnvironment::open(&config.data_dir, config.max_dbs, config.map_size)
            .map_err(|e| CacheError::Storage {
                context: format!("open {}", config.data_dir.display()),
                source: StoreError::from(e),
            })?;
        info!(data_dir = %config.data_dir.display(), "cache store opened");
        Self::with_store(config, store)
    }
}

impl<S: CacheStore> CacheNode<S> {
    pub fn with_store(config: CacheConfig, store: S) -> Result<Self, CacheError> {
        let store = Arc::new(store);
        let metrics = Arc::new(CacheMetrics::new());
        let node = Self {
            dispatcher: Dispatcher::new(Arc::clone(&store), Arc::clone(&metrics)),
            rebuild: RebuildController::new(Arc::clone(&store), Arc::clone(&metrics)),
            records: RecordMirror::new(Arc::clone(&store), Arc::clone(&metrics)),
            config,
            store,
            metrics,
        };
        node.rebuild.setup()?;
        Ok(node)
    }

    /// Verify the plugin tables match this build.
    ///
    /// When they do not and `auto_rebuild` is enabled, the tables are rebuilt
    /// from `inventory` if one is supplied. Otherwise the version error is
    /// returned.
    pub fn ensure_current(&self, inventory: Option<&InventoryReply>) -> Result<(), CacheError> {
        match self.rebuild.check_version() {
            Ok(()) => Ok(()),
            Err(e) if e.needs_rebuild() && self.config.auto_rebuild => match inventory {
                Some(inventory) => {
                    warn!(error = %e, "plugin tables out of date, rebuilding");
                    self.rebuild.build(inventory)?;
                    self.rebuild.check_version()
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }
}
