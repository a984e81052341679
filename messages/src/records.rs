//! Record mirror payloads.
//!
//! The authoritative store pushes record versions into the cache with these
//! payloads. They travel outside the plugin command channel, so they carry no
//! reply side.

use govcache_types::{RecordStatus, Timestamp, Token};
use serde::{Deserialize, Serialize};

/// A metadata stream of a record version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataStream {
    pub id: u64,
    pub payload: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub mime: String,
    pub digest: String,
    pub payload: String,
}

/// One record version as the authoritative store reports it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub token: Token,
    pub version: u64,
    pub status: RecordStatus,
    pub timestamp: Timestamp,
    pub merkle: String,
    pub signature: String,
    #[serde(default)]
    pub metadata: Vec<MetadataStream>,
    #[serde(default)]
    pub files: Vec<File>,
}

/// A new record version was submitted or edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub record: Record,
}

/// The status of a stored record version changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecordStatus {
    pub token: Token,
    pub version: u64,
    pub status: RecordStatus,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub metadata: Vec<MetadataStream>,
}

/// The metadata streams of the latest version of a record changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecordMetadata {
    pub token: Token,
    pub metadata: Vec<MetadataStream>,
}

/// Every record version the authoritative store holds. Input of a record
/// mirror rebuild.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInventory {
    pub records: Vec<Record>,
}
