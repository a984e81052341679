//! Record mirror writes.
//!
//! The authoritative store pushes every new record version, status change
//! and metadata change into the cache. Vote tallying and the token inventory
//! read record status from this mirror, so it must be fed before the plugin
//! tables are of any use.

use std::sync::Arc;

use tracing::{debug, info, warn};

use govcache_messages::{
    NewRecord, Payload, RecordInventory, UpdateRecordMetadata, UpdateRecordStatus,
};
use govcache_store::RecordStore;

use crate::convert;
use crate::error::{CacheError, StoreContext};
use crate::metrics::CacheMetrics;
use crate::tracing_spans::record_write_span;

pub struct RecordMirror<S> {
    store: Arc<S>,
    metrics: Arc<CacheMetrics>,
}

impl<S: RecordStore> RecordMirror<S> {
    pub fn new(store: Arc<S>, metrics: Arc<CacheMetrics>) -> Self {
        Self { store, metrics }
    }

    /// Store a new record version. Versions of a token must arrive in
    /// increasing order.
    pub fn new_record(&self, nr: &NewRecord) -> Result<(), CacheError> {
        let record = &nr.record;
        let _span = record_write_span("new", record.token.as_str()).entered();
        self.store
            .put_record(&convert::record(record))
            .with_context(|| format!("new record {} version {}", record.token, record.version))?;
        self.count("new");
        debug!(version = record.version, status = ?record.status, "record stored");
        Ok(())
    }

    /// Change the status of one stored version and replace its metadata.
    pub fn update_record_status(&self, us: &UpdateRecordStatus) -> Result<(), CacheError> {
        let _span = record_write_span("status", us.token.as_str()).entered();
        self.store
            .update_status(
                &us.token,
                us.version,
                us.status,
                us.timestamp,
                &convert::metadata_streams(&us.metadata),
            )
            .with_context(|| format!("update status of {} version {}", us.token, us.version))?;
        self.count("status");
        debug!(version = us.version, status = ?us.status, "record status updated");
        Ok(())
    }

    /// Replace the metadata streams of the latest version.
    pub fn update_record_metadata(&self, um: &UpdateRecordMetadata) -> Result<(), CacheError> {
        let _span = record_write_span("metadata", um.token.as_str()).entered();
        self.store
            .update_metadata(&um.token, &convert::metadata_streams(&um.metadata))
            .with_context(|| format!("update metadata of {}", um.token))?;
        self.count("metadata");
        debug!(streams = um.metadata.len(), "record metadata updated");
        Ok(())
    }

    /// Replace the whole mirror with `inventory`. On failure the previous
    /// mirror is kept.
    pub fn build(&self, inventory: &RecordInventory) -> Result<(), CacheError> {
        let records: Vec<_> = inventory.records.iter().map(convert::record).collect();
        if let Err(e) = self.store.replace_records(&records).context("rebuild records") {
            warn!(error = %e, "record rebuild failed");
            return Err(e);
        }
        self.count("build");
        info!(records = records.len(), "record mirror rebuilt");
        Ok(())
    }

    /// Decode a record inventory payload and rebuild from it.
    pub fn build_from_payload(&self, payload: &str) -> Result<(), CacheError> {
        self.build(&RecordInventory::decode(payload)?)
    }

    fn count(&self, op: &str) {
        self.metrics.record_writes.with_label_values(&[op]).inc();
    }
}
