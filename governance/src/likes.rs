//! Live comment like tally.

use std::collections::HashMap;

use govcache_store::CommentLikeRow;

/// Aggregate of a comment's like log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LikeTally {
    /// Number of public keys with a standing up or down vote.
    pub total: u64,
    /// Upvotes minus downvotes.
    pub result: i64,
}

impl LikeTally {
    /// Fold a like log, given in append order.
    ///
    /// Per public key the latest action stands. Repeating the standing
    /// action, or sending a neutral action, withdraws it.
    pub fn from_likes<'a>(likes: impl IntoIterator<Item = &'a CommentLikeRow>) -> Self {
        let mut standing: HashMap<&str, i64> = HashMap::new();
        for like in likes {
            let value = like.action.value();
            let current = standing.entry(like.public_key.as_str()).or_insert(0);
            *current = if value == 0 || *current == value {
                0
            } else {
                value
            };
        }
        standing
            .values()
            .filter(|v| **v != 0)
            .fold(Self::default(), |tally, v| Self {
                total: tally.total + 1,
                result: tally.result + v,
            })
    }

    /// Tally per comment id for a whole proposal's like log.
    pub fn by_comment<'a>(
        likes: impl IntoIterator<Item = &'a CommentLikeRow>,
    ) -> HashMap<&'a str, LikeTally> {
        let mut grouped: HashMap<&str, Vec<&CommentLikeRow>> = HashMap::new();
        for like in likes {
            grouped.entry(like.comment_id.as_str()).or_default().push(like);
        }
        grouped
            .into_iter()
            .map(|(id, likes)| (id, Self::from_likes(likes)))
            .collect()
    }
}
