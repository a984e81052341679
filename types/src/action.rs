//! Actions carried by comment likes and vote authorizations.

use serde::{Deserialize, Serialize};

/// Like, dislike, or withdraw a reaction on a comment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LikeAction {
    #[serde(rename = "1")]
    Upvote,
    #[default]
    #[serde(rename = "0")]
    Neutral,
    #[serde(rename = "-1")]
    Downvote,
}

impl LikeAction {
    pub fn value(&self) -> i64 {
        match self {
            Self::Upvote => 1,
            Self::Neutral => 0,
            Self::Downvote => -1,
        }
    }
}

/// Whether a vote authorization grants or withdraws permission to start the
/// vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizeAction {
    Authorize,
    Revoke,
}
