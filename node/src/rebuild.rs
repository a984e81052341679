//! Schema versioning and full rebuild of the plugin tables.

use std::sync::Arc;

use tracing::{info, warn};

use govcache_messages::{InventoryReply, Payload};
use govcache_store::{CacheStore, PluginBatch, PluginStore, StoreError, VersionRecord};
use govcache_types::{Timestamp, PLUGIN_CACHE_VERSION, PLUGIN_ID};

use crate::convert;
use crate::error::{CacheError, StoreContext};
use crate::metrics::CacheMetrics;
use crate::tracing_spans::plugin_build_span;

pub struct RebuildController<S> {
    store: Arc<S>,
    metrics: Arc<CacheMetrics>,
}

impl<S: CacheStore> RebuildController<S> {
    pub fn new(store: Arc<S>, metrics: Arc<CacheMetrics>) -> Self {
        Self { store, metrics }
    }

    /// Create any missing plugin table and stamp the current cache version
    /// if no version record exists. Existing data is untouched.
    pub fn setup(&self) -> Result<(), CacheError> {
        let marker = VersionRecord::new(PLUGIN_ID, PLUGIN_CACHE_VERSION, Timestamp::now());
        self.store
            .create_tables(&marker)
            .context("create plugin tables")?;
        info!(plugin = PLUGIN_ID, version = PLUGIN_CACHE_VERSION, "plugin tables ready");
        Ok(())
    }

    /// Fails with [`CacheError::NoVersionRecord`] or
    /// [`CacheError::WrongVersion`] when the tables must be rebuilt.
    pub fn check_version(&self) -> Result<(), CacheError> {
        let record = self
            .store
            .version_record(PLUGIN_ID)
            .context("read version record")?
            .ok_or_else(|| CacheError::NoVersionRecord(PLUGIN_ID.to_string()))?;
        if record.version != PLUGIN_CACHE_VERSION {
            return Err(CacheError::WrongVersion {
                found: record.version,
                expected: PLUGIN_CACHE_VERSION.to_string(),
            });
        }
        Ok(())
    }

    /// Decode an inventory payload and rebuild from it.
    pub fn build_from_payload(&self, payload: &str) -> Result<(), CacheError> {
        let inventory = InventoryReply::decode(payload)?;
        self.build(&inventory)
    }

    /// Drop and recreate the plugin tables, then replay `inventory` into
    /// them.
    ///
    /// On failure the version record is removed, so the next
    /// [`Self::check_version`] forces another rebuild instead of serving a
    /// partial cache.
    pub fn build(&self, inventory: &InventoryReply) -> Result<(), CacheError> {
        let _span = plugin_build_span(PLUGIN_ID, PLUGIN_CACHE_VERSION).entered();
        self.metrics.rebuilds.inc();

        let result = self.rebuild(inventory);
        if let Err(e) = &result {
            self.metrics.rebuild_failures.inc();
            warn!(error = %e, "plugin rebuild failed");
            if let Err(cleanup) = self.store.delete_version_record(PLUGIN_ID) {
                warn!(error = %cleanup, "could not remove version record");
            }
        }
        result
    }

    fn rebuild(&self, inventory: &InventoryReply) -> Result<(), CacheError> {
        self.store
            .drop_tables(PLUGIN_ID)
            .context("drop plugin tables")?;
        self.setup()?;

        for comment in &inventory.comments {
            let row = convert::comment_row(comment);
            commit_one(self.store.begin(), |batch| batch.insert_comment(&row))
                .with_context(|| format!("replay comment {} on {}", row.comment_id, row.token))?;
        }

        for like in &inventory.like_comments {
            let row = convert::like_row(like);
            commit_one(self.store.begin(), |batch| batch.append_comment_like(&row))
                .with_context(|| format!("replay like on comment {} of {}", row.comment_id, row.token))?;
        }

        for av in &inventory.authorize_votes {
            let reply = inventory
                .authorize_vote_replies
                .iter()
                .find(|r| r.receipt == av.receipt)
                .ok_or_else(|| {
                    CacheError::RecordNotFound(format!(
                        "authorize vote reply for {} with receipt {}",
                        av.token, av.receipt
                    ))
                })?;
            let row = convert::authorize_vote_row(av, reply);
            commit_one(self.store.begin(), |batch| {
                batch.delete_authorize_vote(&row.token, row.version)?;
                batch.insert_authorize_vote(&row)
            })
            .with_context(|| format!("replay authorize vote {} version {}", row.token, row.version))?;
        }

        for tuple in &inventory.start_vote_tuples {
            let row = convert::start_vote_row(&tuple.start_vote, &tuple.start_vote_reply);
            commit_one(self.store.begin(), |batch| batch.insert_start_vote(&row))
                .with_context(|| format!("replay start vote {}", row.token))?;
        }

        for vote in &inventory.cast_votes {
            let row = convert::cast_vote_row(vote);
            commit_one(self.store.begin(), |batch| batch.insert_cast_vote(&row))
                .with_context(|| format!("replay cast vote {} on {}", row.ticket, row.token))?;
        }

        info!(
            comments = inventory.comments.len(),
            likes = inventory.like_comments.len(),
            authorize_votes = inventory.authorize_votes.len(),
            start_votes = inventory.start_vote_tuples.len(),
            cast_votes = inventory.cast_votes.len(),
            "plugin tables rebuilt"
        );
        Ok(())
    }
}

/// Run `f` against a freshly opened batch and commit it.
fn commit_one<B: PluginBatch>(
    batch: Result<B, StoreError>,
    f: impl FnOnce(&mut B) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    let mut batch = batch?;
    f(&mut batch)?;
    batch.commit()
}
