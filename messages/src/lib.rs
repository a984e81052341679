//! Governance plugin command and reply payloads.
//!
//! Every command the cache understands travels as a pair of payloads: the
//! command payload the client sent to the authoritative store, and (for
//! state-changing commands) the reply payload the store produced after
//! executing it. This crate defines both sides and the [`Payload`] codec.
//!
//! Payloads are JSON objects. Decoding tolerates unknown fields and rejects
//! missing required fields. The codec is pure and holds no state.

pub mod command;
pub mod comments;
pub mod inventory;
pub mod records;
pub mod votes;

pub use command::{PluginCommand, UnknownCommand};
pub use comments::{
    CensorComment, CensorCommentReply, Comment, CommentLikes, CommentLikesReply, GetComment,
    GetCommentReply, GetComments, GetCommentsReply, GetProposalCommentsLikes,
    GetProposalCommentsLikesReply, LikeComment, LikeCommentReply, NewComment,
    NewCommentReply,
};
pub use inventory::{
    Inventory, InventoryReply, LoadVoteResults, LoadVoteResultsReply, TokenInventory,
    TokenInventoryReply,
};
pub use records::{
    File, MetadataStream, NewRecord, Record, RecordInventory, UpdateRecordMetadata,
    UpdateRecordStatus,
};
pub use votes::{
    AuthorizeVote, AuthorizeVoteReply, Ballot, BallotReply, CastVote,
    CastVoteReply, ProposalVotes, ProposalVotesReply, StartVote, StartVoteReply, StartVoteTuple,
    Vote, VoteDetails, VoteDetailsReply, VoteOption, VoteOptionResult, VoteSummary,
    VoteSummaryReply,
};

pub use govcache_types::{AuthorizeAction, LikeAction};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// A payload could not be decoded.
#[derive(Debug, Error)]
#[error("decode {kind} payload: {source}")]
pub struct DecodeError {
    /// Which payload type was being decoded.
    pub kind: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// Encode/decode contract shared by every command and reply payload.
pub trait Payload: Serialize + DeserializeOwned {
    /// Name used in decode errors.
    const KIND: &'static str;

    /// Encode to the canonical JSON payload.
    fn encode(&self) -> String {
        serde_json::to_string(self).expect("payload types are always serializable to JSON")
    }

    /// Decode from a JSON payload.
    fn decode(payload: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(payload).map_err(|source| DecodeError {
            kind: Self::KIND,
            source,
        })
    }
}

macro_rules! impl_payload {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl Payload for $ty {
                const KIND: &'static str = $kind;
            }
        )*
    };
}

impl_payload! {
    NewComment => "newcomment",
    NewCommentReply => "newcommentreply",
    LikeComment => "likecomment",
    LikeCommentReply => "likecommentreply",
    CensorComment => "censorcomment",
    CensorCommentReply => "censorcommentreply",
    GetComment => "getcomment",
    GetCommentReply => "getcommentreply",
    GetComments => "getcomments",
    GetCommentsReply => "getcommentsreply",
    CommentLikes => "commentlikes",
    CommentLikesReply => "commentlikesreply",
    GetProposalCommentsLikes => "proposalcommentslikes",
    GetProposalCommentsLikesReply => "proposalcommentslikesreply",
    AuthorizeVote => "authorizevote",
    AuthorizeVoteReply => "authorizevotereply",
    StartVote => "startvote",
    StartVoteReply => "startvotereply",
    VoteDetails => "votedetails",
    VoteDetailsReply => "votedetailsreply",
    Ballot => "ballot",
    BallotReply => "ballotreply",
    ProposalVotes => "proposalvotes",
    ProposalVotesReply => "proposalvotesreply",
    VoteSummary => "votesummary",
    VoteSummaryReply => "votesummaryreply",
    Inventory => "inventory",
    InventoryReply => "inventoryreply",
    LoadVoteResults => "loadvoteresults",
    LoadVoteResultsReply => "loadvoteresultsreply",
    TokenInventory => "tokeninventory",
    TokenInventoryReply => "tokeninventoryreply",
    NewRecord => "newrecord",
    UpdateRecordStatus => "updaterecordstatus",
    UpdateRecordMetadata => "updaterecordmetadata",
    RecordInventory => "recordinventory",
}
