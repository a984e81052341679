use govcache_store::StoreError;
use govcache_types::Token;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("record {0} not found")]
    RecordNotFound(Token),

    #[error("vote results for {token} (ended at height {end_height}) have not been loaded")]
    VoteResultsNotLoaded { token: Token, end_height: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GovernanceError {
    /// Whether the error means a row the caller depends on is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::RecordNotFound(_) | Self::VoteResultsNotLoaded { .. } => true,
            Self::Store(e) => e.is_not_found(),
        }
    }
}
