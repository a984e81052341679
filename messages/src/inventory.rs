//! Inventory, token inventory, and vote-result loading payloads.

use govcache_types::Token;
use serde::{Deserialize, Serialize};

use crate::comments::{Comment, LikeComment};
use crate::votes::{AuthorizeVote, AuthorizeVoteReply, CastVote, StartVoteTuple};

/// Request the full plugin inventory. Carries no fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {}

/// Snapshot of every plugin-owned entity. Also the input of a rebuild.
///
/// Authorize votes and their replies are carried side by side and matched by
/// receipt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReply {
    pub comments: Vec<Comment>,
    pub like_comments: Vec<LikeComment>,
    pub authorize_votes: Vec<AuthorizeVote>,
    pub authorize_vote_replies: Vec<AuthorizeVoteReply>,
    pub start_vote_tuples: Vec<StartVoteTuple>,
    pub cast_votes: Vec<CastVote>,
}

/// Materialize results for every vote that ended at or before `best_block`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadVoteResults {
    pub best_block: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadVoteResultsReply {}

/// Categorize every proposal by voting stage as of `best_block`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInventory {
    pub best_block: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInventoryReply {
    /// Public proposals whose vote has not started.
    pub pre: Vec<Token>,
    /// Proposals whose voting period is still running.
    pub active: Vec<Token>,
    pub approved: Vec<Token>,
    pub rejected: Vec<Token>,
    /// Archived proposals.
    pub abandoned: Vec<Token>,
}
