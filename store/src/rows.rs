//! Rows of the governance plugin tables.
//!
//! Child tables (vote options, vote option results) are stored inline in
//! their parent row: they are created, read and dropped together with it.

use crate::keys;
use govcache_types::{AuthorizeAction, LikeAction, Timestamp, Token};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRow {
    pub token: Token,
    pub comment_id: String,
    pub parent_id: String,
    /// Body. Empty once censored.
    pub comment: String,
    pub signature: String,
    pub public_key: String,
    pub receipt: String,
    pub timestamp: Timestamp,
    pub censored: bool,
}

impl CommentRow {
    pub fn key(&self) -> Vec<u8> {
        keys::named(&self.token, &self.comment_id)
    }

    /// Clear the body and flag the row. The row itself is kept.
    pub fn censor(&mut self) {
        self.comment.clear();
        self.censored = true;
    }
}

/// One entry of the append-only like log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentLikeRow {
    pub token: Token,
    pub comment_id: String,
    pub action: LikeAction,
    pub signature: String,
    pub public_key: String,
}

/// Exactly one row exists per (token, version).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeVoteRow {
    pub token: Token,
    pub version: u64,
    pub action: AuthorizeAction,
    pub signature: String,
    pub public_key: String,
    pub receipt: String,
    pub timestamp: Timestamp,
}

impl AuthorizeVoteRow {
    pub fn key(&self) -> Vec<u8> {
        keys::versioned(&self.token, self.version)
    }

    pub fn is_authorized(&self) -> bool {
        self.action == AuthorizeAction::Authorize
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOptionRow {
    pub id: String,
    pub description: String,
    pub bits: u64,
}

impl VoteOptionRow {
    /// Vote bit as cast votes carry it: lowercase hex of `bits`.
    pub fn vote_bit(&self) -> String {
        format!("{:x}", self.bits)
    }
}

/// Vote definition plus the authoritative store's answer to starting it.
/// Immutable once stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartVoteRow {
    pub token: Token,
    pub public_key: String,
    pub signature: String,
    pub mask: u64,
    /// Duration in blocks.
    pub duration: u32,
    pub quorum_percentage: u32,
    pub pass_percentage: u32,
    pub options: Vec<VoteOptionRow>,
    pub start_block_height: u32,
    pub start_block_hash: String,
    pub end_height: u64,
    pub eligible_tickets: Vec<String>,
    pub eligible_ticket_count: u64,
}

impl StartVoteRow {
    /// Whether voting has ended at `best_block`.
    pub fn has_ended(&self, best_block: u64) -> bool {
        self.end_height <= best_block
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVoteRow {
    pub token: Token,
    pub ticket: String,
    pub vote_bit: String,
    pub signature: String,
}

impl CastVoteRow {
    pub fn key(&self) -> Vec<u8> {
        keys::named(&self.token, &self.ticket)
    }

    /// Key of the (token, vote bit) tally index entry.
    pub fn token_vote_bit(&self) -> Vec<u8> {
        keys::vote_bit_ticket(&self.token, &self.vote_bit, &self.ticket)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOptionResultRow {
    pub option: VoteOptionRow,
    pub votes: u64,
}

/// Materialized outcome of a finished vote. Written once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResultsRow {
    pub token: Token,
    pub approved: bool,
    pub results: Vec<VoteOptionResultRow>,
}

impl VoteResultsRow {
    pub fn total_votes(&self) -> u64 {
        self.results.iter().map(|r| r.votes).sum()
    }
}
