//! Voting lifecycle of a proposal.

use std::fmt;

/// Where a proposal stands in its voting lifecycle. `Resulted` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoteStatus {
    /// No standing authorization for the latest record version.
    Unauthorized,
    /// Authorized but not started.
    Authorized,
    VotingActive,
    /// End height reached, results not yet materialized.
    VotingEnded,
    Resulted,
}

impl VoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Authorized => "authorized",
            Self::VotingActive => "voting_active",
            Self::VotingEnded => "voting_ended",
            Self::Resulted => "resulted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resulted)
    }
}

impl fmt::Display for VoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
