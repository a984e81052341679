//! LMDB implementation of PluginStore.

use tracing::{debug, info};

use govcache_store::keys;
use govcache_store::{
    AuthorizeVoteRow, CastVoteRow, CommentLikeRow, CommentRow, PluginStore, StartVoteRow,
    StoreError, VersionRecord, VoteResultsRow,
};
use govcache_types::Token;

use crate::environment::{count_prefix, get, scan_all, scan_prefix};
use crate::write_batch::{WriteBatch, LIKE_SEQ_KEY};
use crate::{LmdbEnvironment, LmdbError};

fn version_key(plugin_id: &str) -> Vec<u8> {
    format!("version/{plugin_id}").into_bytes()
}

impl PluginStore for LmdbEnvironment {
    type Batch<'a> = WriteBatch<'a>;

    fn begin(&self) -> Result<WriteBatch<'_>, StoreError> {
        self.write_batch()
    }

    fn comment(&self, token: &Token, comment_id: &str) -> Result<Option<CommentRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get(&self.comments_db, &rtxn, &keys::named(token, comment_id))
    }

    fn comments(&self, token: &Token) -> Result<Vec<CommentRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        scan_prefix(&self.comments_db, &rtxn, &keys::token_prefix(token))
    }

    fn all_comments(&self) -> Result<Vec<CommentRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        scan_all(&self.comments_db, &rtxn)
    }

    fn comment_likes(
        &self,
        token: &Token,
        comment_id: &str,
    ) -> Result<Vec<CommentLikeRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        scan_prefix(
            &self.comment_likes_db,
            &rtxn,
            &keys::comment_like_prefix(token, comment_id),
        )
    }

    fn proposal_comment_likes(&self, token: &Token) -> Result<Vec<CommentLikeRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        scan_prefix(&self.comment_likes_db, &rtxn, &keys::token_prefix(token))
    }

    fn all_comment_likes(&self) -> Result<Vec<CommentLikeRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        scan_all(&self.comment_likes_db, &rtxn)
    }

    fn authorize_vote(
        &self,
        token: &Token,
        version: u64,
    ) -> Result<Option<AuthorizeVoteRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get(&self.authorize_votes_db, &rtxn, &keys::versioned(token, version))
    }

    fn all_authorize_votes(&self) -> Result<Vec<AuthorizeVoteRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        scan_all(&self.authorize_votes_db, &rtxn)
    }

    fn start_vote(&self, token: &Token) -> Result<Option<StartVoteRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get(&self.start_votes_db, &rtxn, &keys::token_prefix(token))
    }

    fn all_start_votes(&self) -> Result<Vec<StartVoteRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        scan_all(&self.start_votes_db, &rtxn)
    }

    fn cast_votes(&self, token: &Token) -> Result<Vec<CastVoteRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        scan_prefix(&self.cast_votes_db, &rtxn, &keys::token_prefix(token))
    }

    fn all_cast_votes(&self) -> Result<Vec<CastVoteRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        scan_all(&self.cast_votes_db, &rtxn)
    }

    fn count_cast_votes(&self, token: &Token, vote_bit: &str) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        count_prefix(
            &self.cast_vote_bits_db,
            &rtxn,
            &keys::vote_bit_prefix(token, vote_bit),
        )
    }

    fn vote_results(&self, token: &Token) -> Result<Option<VoteResultsRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get(&self.vote_results_db, &rtxn, &keys::token_prefix(token))
    }

    fn all_vote_results(&self) -> Result<Vec<VoteResultsRow>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        scan_all(&self.vote_results_db, &rtxn)
    }

    fn unmaterialized_ended_votes(&self, best_block: u64) -> Result<Vec<StartVoteRow>, StoreError> {
        // Single read transaction so the start votes and results agree.
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut pending = Vec::new();
        for start_vote in scan_all::<StartVoteRow>(&self.start_votes_db, &rtxn)? {
            if !start_vote.has_ended(best_block) {
                continue;
            }
            let key = keys::token_prefix(&start_vote.token);
            if self
                .vote_results_db
                .get(&rtxn, &key)
                .map_err(LmdbError::from)?
                .is_none()
            {
                pending.push(start_vote);
            }
        }
        Ok(pending)
    }

    fn version_record(&self, plugin_id: &str) -> Result<Option<VersionRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get(&self.meta_db, &rtxn, &version_key(plugin_id))
    }

    fn create_tables(&self, marker: &VersionRecord) -> Result<(), StoreError> {
        // Named databases are created when the environment opens; only the
        // version record can be missing here.
        let key = version_key(&marker.id);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .meta_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .is_none()
        {
            let bytes = bincode::serialize(marker).map_err(LmdbError::from)?;
            self.meta_db
                .put(&mut wtxn, &key, &bytes)
                .map_err(LmdbError::from)?;
            info!(plugin = %marker.id, version = %marker.version, "created version record");
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn drop_tables(&self, plugin_id: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for db in self.plugin_dbs() {
            db.clear(&mut wtxn).map_err(LmdbError::from)?;
        }
        self.meta_db
            .delete(&mut wtxn, &version_key(plugin_id))
            .map_err(LmdbError::from)?;
        self.meta_db
            .delete(&mut wtxn, LIKE_SEQ_KEY)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        debug!(plugin = plugin_id, "dropped plugin tables");
        Ok(())
    }

    fn delete_version_record(&self, plugin_id: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .delete(&mut wtxn, &version_key(plugin_id))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
