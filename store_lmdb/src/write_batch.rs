//! Write batching: groups plugin table writes into a single LMDB write
//! transaction.
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! operations are rolled back (the underlying LMDB transaction is aborted).

use heed::RwTxn;
use serde::Serialize;

use govcache_store::keys;
use govcache_store::{
    AuthorizeVoteRow, CastVoteRow, CommentLikeRow, CommentRow, PluginBatch, StartVoteRow,
    StoreError, VoteResultsRow,
};
use govcache_types::Token;

use crate::environment::{get, BytesDb};
use crate::{LmdbEnvironment, LmdbError};

/// Meta key of the like-log sequence counter.
pub(crate) const LIKE_SEQ_KEY: &[u8] = b"comment_like_seq";

pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env.write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }

    fn exists(&self, db: BytesDb, key: &[u8]) -> Result<bool, StoreError> {
        Ok(db.get(&self.txn, key).map_err(LmdbError::from)?.is_some())
    }

    fn put<T: Serialize>(
        &mut self,
        db: BytesDb,
        key: &[u8],
        value: &T,
    ) -> Result<(), StoreError> {
        let bytes = bincode::serialize(value).map_err(LmdbError::from)?;
        db.put(&mut self.txn, key, &bytes).map_err(LmdbError::from)?;
        Ok(())
    }

    /// Insert under `key`, failing with `Duplicate` if it is taken.
    fn insert_new<T: Serialize>(
        &mut self,
        db: BytesDb,
        key: &[u8],
        value: &T,
        what: impl FnOnce() -> String,
    ) -> Result<(), StoreError> {
        if self.exists(db, key)? {
            return Err(LmdbError::Duplicate(what()).into());
        }
        self.put(db, key, value)
    }

    fn next_like_seq(&mut self) -> Result<u64, StoreError> {
        let current = match self
            .env
            .meta_db
            .get(&self.txn, LIKE_SEQ_KEY)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                    StoreError::Corruption("comment_like_seq has unexpected byte length".into())
                })?;
                u64::from_be_bytes(arr)
            }
            None => 0,
        };
        let next = current + 1;
        self.env
            .meta_db
            .put(&mut self.txn, LIKE_SEQ_KEY, &next.to_be_bytes())
            .map_err(LmdbError::from)?;
        Ok(current)
    }
}

impl PluginBatch for WriteBatch<'_> {
    fn insert_comment(&mut self, row: &CommentRow) -> Result<(), StoreError> {
        self.insert_new(self.env.comments_db, &row.key(), row, || {
            format!("comment {} on {}", row.comment_id, row.token)
        })
    }

    fn censor_comment(&mut self, token: &Token, comment_id: &str) -> Result<(), StoreError> {
        let key = keys::named(token, comment_id);
        let mut row: CommentRow = get(&self.env.comments_db, &self.txn, &key)?
            .ok_or_else(|| LmdbError::NotFound(format!("comment {comment_id} on {token}")))?;
        row.censor();
        self.put(self.env.comments_db, &key, &row)
    }

    fn append_comment_like(&mut self, row: &CommentLikeRow) -> Result<(), StoreError> {
        let seq = self.next_like_seq()?;
        let key = keys::comment_like(&row.token, &row.comment_id, seq);
        self.put(self.env.comment_likes_db, &key, row)
    }

    fn delete_authorize_vote(&mut self, token: &Token, version: u64) -> Result<(), StoreError> {
        self.env
            .authorize_votes_db
            .delete(&mut self.txn, &keys::versioned(token, version))
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn insert_authorize_vote(&mut self, row: &AuthorizeVoteRow) -> Result<(), StoreError> {
        self.insert_new(self.env.authorize_votes_db, &row.key(), row, || {
            format!("authorize vote for {} version {}", row.token, row.version)
        })
    }

    fn insert_start_vote(&mut self, row: &StartVoteRow) -> Result<(), StoreError> {
        let key = keys::token_prefix(&row.token);
        self.insert_new(self.env.start_votes_db, &key, row, || {
            format!("start vote for {}", row.token)
        })
    }

    fn insert_cast_vote(&mut self, row: &CastVoteRow) -> Result<(), StoreError> {
        self.insert_new(self.env.cast_votes_db, &row.key(), row, || {
            format!("cast vote by ticket {} on {}", row.ticket, row.token)
        })?;
        self.env
            .cast_vote_bits_db
            .put(&mut self.txn, &row.token_vote_bit(), &[])
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn insert_vote_results(&mut self, row: &VoteResultsRow) -> Result<(), StoreError> {
        let key = keys::token_prefix(&row.token);
        self.insert_new(self.env.vote_results_db, &key, row, || {
            format!("vote results for {}", row.token)
        })
    }

    fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
