//! Vote authorization, vote definition, ballot, and summary payloads.

use govcache_types::{AuthorizeAction, Timestamp, Token};
use serde::{Deserialize, Serialize};

/// Authorize (or revoke authorization of) the vote on a record version.
///
/// `receipt` and `timestamp` are stamped by the authoritative store; they are
/// empty on the client's command and filled in the inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeVote {
    pub action: AuthorizeAction,
    pub token: Token,
    pub signature: String,
    pub public_key: String,
    #[serde(default)]
    pub receipt: String,
    #[serde(default)]
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeVoteReply {
    pub action: AuthorizeAction,
    /// Record version the authorization applies to.
    pub record_version: u64,
    pub receipt: String,
    pub timestamp: Timestamp,
}

/// One choice on a ballot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOption {
    pub id: String,
    pub description: String,
    pub bits: u64,
}

impl VoteOption {
    /// The vote bit a cast vote carries when it picks this option.
    pub fn vote_bit(&self) -> String {
        format!("{:x}", self.bits)
    }
}

/// Parameters of a vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub token: Token,
    pub mask: u64,
    /// Voting period length in blocks.
    pub duration: u32,
    pub quorum_percentage: u32,
    pub pass_percentage: u32,
    pub options: Vec<VoteOption>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartVote {
    pub public_key: String,
    pub vote: Vote,
    pub signature: String,
}

/// The authoritative store's answer to [`StartVote`]: the ledger snapshot the
/// vote was started against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartVoteReply {
    pub start_block_height: u32,
    pub start_block_hash: String,
    pub end_height: u64,
    pub eligible_tickets: Vec<String>,
}

/// A start vote paired with its reply, as carried in the inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartVoteTuple {
    pub start_vote: StartVote,
    pub start_vote_reply: StartVoteReply,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDetails {
    pub token: Token,
}

/// Authorization and vote definition for a proposal; absent parts are `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDetailsReply {
    pub authorize_vote: Option<AuthorizeVote>,
    pub start_vote: Option<StartVote>,
    pub start_vote_reply: Option<StartVoteReply>,
}

/// A ticket's vote on a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVote {
    pub token: Token,
    pub ticket: String,
    /// Lowercase hex rendering of the chosen option's bits.
    pub vote_bit: String,
    pub signature: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub votes: Vec<CastVote>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVoteReply {
    pub client_signature: String,
    pub signature: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotReply {
    pub receipts: Vec<CastVoteReply>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalVotes {
    pub token: Token,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalVotesReply {
    pub start_vote: Option<StartVote>,
    pub cast_votes: Vec<CastVote>,
}

/// Vote count for one option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOptionResult {
    pub id: String,
    pub description: String,
    pub bits: u64,
    pub votes: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSummary {
    pub token: Token,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSummaryReply {
    pub authorized: bool,
    /// `None` until a vote has been started.
    pub end_height: Option<u64>,
    pub eligible_ticket_count: u64,
    pub quorum_percentage: u32,
    pub pass_percentage: u32,
    pub results: Vec<VoteOptionResult>,
}
