//! Comment and comment-like payloads.

use govcache_types::{LikeAction, Timestamp, Token};
use serde::{Deserialize, Serialize};

/// A comment as returned by read commands and carried in the inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub token: Token,
    pub parent_id: String,
    pub comment: String,
    pub signature: String,
    pub public_key: String,
    pub comment_id: String,
    pub receipt: String,
    pub timestamp: Timestamp,
    /// Number of users with a live like/dislike on the comment.
    #[serde(default)]
    pub total_votes: u64,
    /// Sum of live likes (+1) and dislikes (-1).
    #[serde(default)]
    pub result_votes: i64,
    #[serde(default)]
    pub censored: bool,
}

/// Submit a new comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub token: Token,
    pub parent_id: String,
    pub comment: String,
    pub signature: String,
    pub public_key: String,
}

/// The authoritative store's answer to [`NewComment`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCommentReply {
    pub comment_id: String,
    pub receipt: String,
    pub timestamp: Timestamp,
}

/// A single entry of the append-only comment-like log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeComment {
    pub token: Token,
    pub comment_id: String,
    pub action: LikeAction,
    pub signature: String,
    pub public_key: String,
}

/// The authoritative store's answer to [`LikeComment`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeCommentReply {
    pub total: u64,
    pub result: i64,
    pub receipt: String,
}

/// Censor a comment: its body is removed but the row is kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensorComment {
    pub token: Token,
    pub comment_id: String,
    pub reason: String,
    pub signature: String,
    pub public_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensorCommentReply {
    pub receipt: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetComment {
    pub token: Token,
    pub comment_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCommentReply {
    pub comment: Comment,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetComments {
    pub token: Token,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCommentsReply {
    pub comments: Vec<Comment>,
}

/// All likes recorded against one comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentLikes {
    pub token: Token,
    pub comment_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentLikesReply {
    pub comment_likes: Vec<LikeComment>,
}

/// All likes recorded against every comment of a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProposalCommentsLikes {
    pub token: Token,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProposalCommentsLikesReply {
    pub comments_likes: Vec<LikeComment>,
}
