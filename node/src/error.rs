use govcache_governance::GovernanceError;
use govcache_messages::{DecodeError, UnknownCommand};
use govcache_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("no version record for plugin '{0}'")]
    NoVersionRecord(String),

    #[error("plugin cache version mismatch: found {found}, expected {expected}")]
    WrongVersion { found: String, expected: String },

    #[error(transparent)]
    InvalidPluginCommand(#[from] UnknownCommand),

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: StoreError,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl CacheError {
    /// Whether the cache must be rebuilt before it can serve traffic.
    pub fn needs_rebuild(&self) -> bool {
        matches!(self, Self::NoVersionRecord(_) | Self::WrongVersion { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound(_))
    }
}

impl From<GovernanceError> for CacheError {
    fn from(e: GovernanceError) -> Self {
        match e {
            GovernanceError::RecordNotFound(token) => Self::RecordNotFound(token.to_string()),
            e @ GovernanceError::VoteResultsNotLoaded { .. } => Self::RecordNotFound(e.to_string()),
            GovernanceError::Store(source) => source_error("vote tally".to_string(), source),
        }
    }
}

fn source_error(context: String, source: StoreError) -> CacheError {
    match source {
        StoreError::NotFound(what) => CacheError::RecordNotFound(what),
        source => CacheError::Storage { context, source },
    }
}

/// Attach operation context to storage errors.
///
/// `NotFound` becomes [`CacheError::RecordNotFound`]; everything else is
/// wrapped in [`CacheError::Storage`].
pub trait StoreContext<T> {
    fn context(self, context: &str) -> Result<T, CacheError>;

    fn with_context(self, context: impl FnOnce() -> String) -> Result<T, CacheError>;
}

impl<T> StoreContext<T> for Result<T, StoreError> {
    fn context(self, context: &str) -> Result<T, CacheError> {
        self.map_err(|source| source_error(context.to_string(), source))
    }

    fn with_context(self, context: impl FnOnce() -> String) -> Result<T, CacheError> {
        self.map_err(|source| source_error(context(), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govcache_types::Token;

    #[test]
    fn not_found_store_errors_become_record_not_found() {
        let err = Err::<(), _>(StoreError::NotFound("comment 1".into()))
            .context("censor comment")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn backend_errors_keep_context() {
        let err = Err::<(), _>(StoreError::Backend("disk full".into()))
            .with_context(|| format!("insert cast vote {}", "t1"))
            .unwrap_err();
        assert_eq!(err.to_string(), "insert cast vote t1: storage backend error: disk full");
    }

    #[test]
    fn pending_results_are_not_found_class() {
        let err: CacheError = GovernanceError::VoteResultsNotLoaded {
            token: Token::new("aa"),
            end_height: 10,
        }
        .into();
        assert!(err.is_not_found());
    }

    #[test]
    fn version_errors_need_rebuild() {
        assert!(CacheError::NoVersionRecord("governance".into()).needs_rebuild());
        assert!(CacheError::WrongVersion {
            found: "1.0".into(),
            expected: "1.1".into()
        }
        .needs_rebuild());
        assert!(!CacheError::Config("bad".into()).needs_rebuild());
    }
}
