//! Versioned record storage trait.

use crate::StoreError;
use govcache_types::{RecordStatus, Timestamp, Token};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form metadata attached to a record version, keyed by stream id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataStream {
    pub id: u64,
    pub payload: String,
}

/// A file belonging to a record version. `digest` is the content hash the
/// authoritative store computed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub mime: String,
    pub digest: String,
    pub payload: String,
}

/// One (token, version) snapshot of a record.
///
/// Everything except `status`, `timestamp` and `metadata` is immutable once
/// the version is stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub token: Token,
    pub version: u64,
    pub status: RecordStatus,
    pub timestamp: Timestamp,
    /// Merkle root of the file digests.
    pub merkle: String,
    /// Authoritative store signature over `merkle ++ token`.
    pub signature: String,
    pub metadata: Vec<MetadataStream>,
    pub files: Vec<File>,
}

/// Number of latest record versions per status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub by_status: BTreeMap<u8, u64>,
}

impl InventoryStats {
    pub fn count(&self, status: RecordStatus) -> u64 {
        self.by_status.get(&status.code()).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.by_status.values().sum()
    }

    pub fn record(&mut self, status: RecordStatus) {
        *self.by_status.entry(status.code()).or_insert(0) += 1;
    }
}

/// Trait for the record mirror.
///
/// Versions of a token strictly increase. A version is never overwritten;
/// only its mutable fields change through `update_status`/`update_metadata`.
pub trait RecordStore {
    /// Insert a new version.
    ///
    /// Fails with `Duplicate` when the version exists and with
    /// `StaleVersion` when a newer version is already stored.
    fn put_record(&self, record: &Record) -> Result<(), StoreError>;

    /// The highest version stored for `token`.
    fn latest(&self, token: &Token) -> Result<Record, StoreError>;

    fn by_version(&self, token: &Token, version: u64) -> Result<Record, StoreError>;

    fn update_status(
        &self,
        token: &Token,
        version: u64,
        status: RecordStatus,
        timestamp: Timestamp,
        metadata: &[MetadataStream],
    ) -> Result<(), StoreError>;

    /// Replace the metadata streams of the latest version of `token`.
    fn update_metadata(&self, token: &Token, metadata: &[MetadataStream])
        -> Result<(), StoreError>;

    /// Drop every stored record and store `records` instead, all at once.
    ///
    /// Every version is kept, in any input order. Fails with `Duplicate`
    /// when a (token, version) pair appears twice, leaving the mirror as it
    /// was.
    fn replace_records(&self, records: &[Record]) -> Result<(), StoreError>;

    /// Latest version of every record, ordered by token.
    fn inventory(&self) -> Result<Vec<Record>, StoreError>;

    fn inventory_stats(&self) -> Result<InventoryStats, StoreError> {
        let mut stats = InventoryStats::default();
        for record in self.inventory()? {
            stats.record(record.status);
        }
        Ok(stats)
    }

    /// Latest record, or `None` when the token is unknown.
    fn try_latest(&self, token: &Token) -> Result<Option<Record>, StoreError> {
        match self.latest(token) {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Check that `record` may be stored on top of `latest`.
///
/// Shared by every backend so the version rules are identical.
pub fn check_new_version(record: &Record, latest: Option<u64>) -> Result<(), StoreError> {
    match latest {
        Some(v) if v == record.version => Err(StoreError::Duplicate(format!(
            "record {} version {}",
            record.token, record.version
        ))),
        Some(v) if v > record.version => Err(StoreError::StaleVersion {
            token: record.token.to_string(),
            version: record.version,
            latest: v,
        }),
        _ => Ok(()),
    }
}
