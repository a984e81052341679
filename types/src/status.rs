//! Record status as reported by the authoritative store.

use serde::{Deserialize, Serialize};

/// Status of a record version.
///
/// The numeric codes are the ones the authoritative store uses on the wire
/// and are persisted as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RecordStatus {
    Invalid,
    NotFound,
    NotReviewed,
    Censored,
    Public,
    UnreviewedChanges,
    Archived,
}

impl RecordStatus {
    /// All statuses in code order.
    pub const ALL: [RecordStatus; 7] = [
        Self::Invalid,
        Self::NotFound,
        Self::NotReviewed,
        Self::Censored,
        Self::Public,
        Self::UnreviewedChanges,
        Self::Archived,
    ];

    pub fn code(&self) -> u8 {
        match self {
            Self::Invalid => 0,
            Self::NotFound => 1,
            Self::NotReviewed => 2,
            Self::Censored => 3,
            Self::Public => 4,
            Self::UnreviewedChanges => 5,
            Self::Archived => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::NotFound => "not_found",
            Self::NotReviewed => "not_reviewed",
            Self::Censored => "censored",
            Self::Public => "public",
            Self::UnreviewedChanges => "unreviewed_changes",
            Self::Archived => "archived",
        }
    }
}

impl From<RecordStatus> for u8 {
    fn from(status: RecordStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for RecordStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| format!("unknown record status code {code}"))
    }
}
