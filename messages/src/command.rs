//! The closed set of plugin commands.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A command name that is not part of the governance plugin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown plugin command: {0}")]
pub struct UnknownCommand(pub String);

/// Every command the governance plugin understands.
///
/// The wire names are stable strings shared with the authoritative store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PluginCommand {
    NewComment,
    LikeComment,
    CensorComment,
    GetComment,
    GetComments,
    CommentLikes,
    ProposalCommentsLikes,
    AuthorizeVote,
    StartVote,
    VoteDetails,
    Ballot,
    ProposalVotes,
    BestBlock,
    Inventory,
    LoadVoteResults,
    TokenInventory,
    VoteSummary,
}

impl PluginCommand {
    pub const ALL: [PluginCommand; 17] = [
        Self::NewComment,
        Self::LikeComment,
        Self::CensorComment,
        Self::GetComment,
        Self::GetComments,
        Self::CommentLikes,
        Self::ProposalCommentsLikes,
        Self::AuthorizeVote,
        Self::StartVote,
        Self::VoteDetails,
        Self::Ballot,
        Self::ProposalVotes,
        Self::BestBlock,
        Self::Inventory,
        Self::LoadVoteResults,
        Self::TokenInventory,
        Self::VoteSummary,
    ];

    /// Wire name of the command.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewComment => "newcomment",
            Self::LikeComment => "likecomment",
            Self::CensorComment => "censorcomment",
            Self::GetComment => "getcomment",
            Self::GetComments => "getcomments",
            Self::CommentLikes => "commentlikes",
            Self::ProposalCommentsLikes => "proposalcommentslikes",
            Self::AuthorizeVote => "authorizevote",
            Self::StartVote => "startvote",
            Self::VoteDetails => "votedetails",
            Self::Ballot => "ballot",
            Self::ProposalVotes => "proposalvotes",
            Self::BestBlock => "bestblock",
            Self::Inventory => "inventory",
            Self::LoadVoteResults => "loadvoteresults",
            Self::TokenInventory => "tokeninventory",
            Self::VoteSummary => "votesummary",
        }
    }

    /// Whether the command carries a reply payload produced by the
    /// authoritative store that the cache must persist.
    pub fn is_write_through(&self) -> bool {
        matches!(
            self,
            Self::NewComment
                | Self::LikeComment
                | Self::CensorComment
                | Self::AuthorizeVote
                | Self::StartVote
                | Self::Ballot
        )
    }
}

impl fmt::Display for PluginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}
