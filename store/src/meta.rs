//! Schema-version marker.

use govcache_types::Timestamp;
use serde::{Deserialize, Serialize};

/// Records which version of the plugin tables a cache holds.
///
/// Keyed by plugin identity. Its absence, or a version other than the one
/// the running build expects, means the plugin tables must be rebuilt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: String,
    pub version: String,
    pub timestamp: Timestamp,
}

impl VersionRecord {
    pub fn new(id: impl Into<String>, version: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            timestamp,
        }
    }
}
