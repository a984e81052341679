//! Governance plugin table storage traits.

use crate::rows::{
    AuthorizeVoteRow, CastVoteRow, CommentLikeRow, CommentRow, StartVoteRow, VoteResultsRow,
};
use crate::{StoreError, VersionRecord};
use govcache_types::Token;

/// Tables owned by the governance plugin. Dropped and recreated together.
pub const PLUGIN_TABLES: [&str; 7] = [
    "comments",
    "comment_likes",
    "authorize_votes",
    "start_votes",
    "cast_votes",
    "cast_vote_bits",
    "vote_results",
];

/// Read access and schema management for the plugin tables.
///
/// Lookups that may legitimately find nothing return `Option`/empty vectors;
/// `Err` is reserved for backend failures.
pub trait PluginStore {
    type Batch<'a>: PluginBatch
    where
        Self: 'a;

    /// Open a write batch. Nothing it writes is visible to readers until
    /// [`PluginBatch::commit`].
    fn begin(&self) -> Result<Self::Batch<'_>, StoreError>;

    fn comment(&self, token: &Token, comment_id: &str) -> Result<Option<CommentRow>, StoreError>;
    fn comments(&self, token: &Token) -> Result<Vec<CommentRow>, StoreError>;
    fn all_comments(&self) -> Result<Vec<CommentRow>, StoreError>;

    /// Likes of one comment in the order they were appended.
    fn comment_likes(&self, token: &Token, comment_id: &str)
        -> Result<Vec<CommentLikeRow>, StoreError>;
    fn proposal_comment_likes(&self, token: &Token) -> Result<Vec<CommentLikeRow>, StoreError>;
    fn all_comment_likes(&self) -> Result<Vec<CommentLikeRow>, StoreError>;

    fn authorize_vote(
        &self,
        token: &Token,
        version: u64,
    ) -> Result<Option<AuthorizeVoteRow>, StoreError>;
    fn all_authorize_votes(&self) -> Result<Vec<AuthorizeVoteRow>, StoreError>;

    fn start_vote(&self, token: &Token) -> Result<Option<StartVoteRow>, StoreError>;
    fn all_start_votes(&self) -> Result<Vec<StartVoteRow>, StoreError>;

    fn cast_votes(&self, token: &Token) -> Result<Vec<CastVoteRow>, StoreError>;
    fn all_cast_votes(&self) -> Result<Vec<CastVoteRow>, StoreError>;

    /// Number of cast votes for `token` carrying `vote_bit`.
    fn count_cast_votes(&self, token: &Token, vote_bit: &str) -> Result<u64, StoreError>;

    fn vote_results(&self, token: &Token) -> Result<Option<VoteResultsRow>, StoreError>;
    fn all_vote_results(&self) -> Result<Vec<VoteResultsRow>, StoreError>;

    /// Start votes that ended at or before `best_block` and have no
    /// materialized results yet.
    fn unmaterialized_ended_votes(&self, best_block: u64) -> Result<Vec<StartVoteRow>, StoreError> {
        let mut pending = Vec::new();
        for start_vote in self.all_start_votes()? {
            if start_vote.has_ended(best_block) && self.vote_results(&start_vote.token)?.is_none() {
                pending.push(start_vote);
            }
        }
        Ok(pending)
    }

    fn version_record(&self, plugin_id: &str) -> Result<Option<VersionRecord>, StoreError>;

    /// Create any missing plugin table and store `marker` if no version
    /// record exists for its plugin. Existing data is left untouched.
    fn create_tables(&self, marker: &VersionRecord) -> Result<(), StoreError>;

    /// Drop every plugin table and the version record of `plugin_id` in one
    /// transaction.
    fn drop_tables(&self, plugin_id: &str) -> Result<(), StoreError>;

    fn delete_version_record(&self, plugin_id: &str) -> Result<(), StoreError>;
}

/// Writes against the plugin tables. All-or-nothing: dropping a batch
/// without calling [`PluginBatch::commit`] discards every write in it.
pub trait PluginBatch {
    /// Fails with `Duplicate` if the comment id is taken.
    fn insert_comment(&mut self, row: &CommentRow) -> Result<(), StoreError>;

    /// Fails with `NotFound` if the comment does not exist.
    fn censor_comment(&mut self, token: &Token, comment_id: &str) -> Result<(), StoreError>;

    fn append_comment_like(&mut self, row: &CommentLikeRow) -> Result<(), StoreError>;

    /// Remove the row for (token, version) if present.
    fn delete_authorize_vote(&mut self, token: &Token, version: u64) -> Result<(), StoreError>;

    /// Fails with `Duplicate` if a row for (token, version) exists.
    fn insert_authorize_vote(&mut self, row: &AuthorizeVoteRow) -> Result<(), StoreError>;

    /// Fails with `Duplicate` if the token already has a start vote.
    fn insert_start_vote(&mut self, row: &StartVoteRow) -> Result<(), StoreError>;

    /// Fails with `Duplicate` if the ticket already voted on the token.
    fn insert_cast_vote(&mut self, row: &CastVoteRow) -> Result<(), StoreError>;

    /// Write-once: fails with `Duplicate` if results exist for the token.
    fn insert_vote_results(&mut self, row: &VoteResultsRow) -> Result<(), StoreError>;

    fn commit(self) -> Result<(), StoreError>;
}
