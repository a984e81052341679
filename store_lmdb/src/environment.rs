//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use serde::de::DeserializeOwned;
use tracing::debug;

use govcache_store::keys::prefix_end;
use govcache_store::StoreError;

use crate::write_batch::WriteBatch;
use crate::{prefix_bounds, LmdbError};

/// Every table is raw bytes to raw bytes; rows are bincode-encoded.
pub(crate) type BytesDb = Database<Bytes, Bytes>;

/// Number of named databases the cache creates.
pub const DATABASE_COUNT: u32 = 9;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    pub(crate) records_db: Database<Bytes, Bytes>,
    pub(crate) comments_db: Database<Bytes, Bytes>,
    pub(crate) comment_likes_db: Database<Bytes, Bytes>,
    pub(crate) authorize_votes_db: Database<Bytes, Bytes>,
    pub(crate) start_votes_db: Database<Bytes, Bytes>,
    pub(crate) cast_votes_db: Database<Bytes, Bytes>,
    pub(crate) cast_vote_bits_db: Database<Bytes, Bytes>,
    pub(crate) vote_results_db: Database<Bytes, Bytes>,
    /// Version records and the like-log sequence counter.
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path).map_err(heed::Error::Io)?;

        // SAFETY: the environment is opened once per path by this process and
        // the map is never accessed outside heed.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs.max(DATABASE_COUNT))
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let records_db = env.create_database(&mut wtxn, Some("records"))?;
        let comments_db = env.create_database(&mut wtxn, Some("comments"))?;
        let comment_likes_db = env.create_database(&mut wtxn, Some("comment_likes"))?;
        let authorize_votes_db = env.create_database(&mut wtxn, Some("authorize_votes"))?;
        let start_votes_db = env.create_database(&mut wtxn, Some("start_votes"))?;
        let cast_votes_db = env.create_database(&mut wtxn, Some("cast_votes"))?;
        let cast_vote_bits_db = env.create_database(&mut wtxn, Some("cast_vote_bits"))?;
        let vote_results_db = env.create_database(&mut wtxn, Some("vote_results"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            records_db,
            comments_db,
            comment_likes_db,
            authorize_votes_db,
            start_votes_db,
            cast_votes_db,
            cast_vote_bits_db,
            vote_results_db,
            meta_db,
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Begin a write batch over the plugin tables.
    pub fn write_batch(&self) -> Result<WriteBatch<'_>, StoreError> {
        WriteBatch::new(self)
    }

    /// Handles of the plugin tables, in drop order.
    pub(crate) fn plugin_dbs(&self) -> [Database<Bytes, Bytes>; 7] {
        [
            self.comments_db,
            self.comment_likes_db,
            self.authorize_votes_db,
            self.start_votes_db,
            self.cast_votes_db,
            self.cast_vote_bits_db,
            self.vote_results_db,
        ]
    }
}

/// Decode one value.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    Ok(bincode::deserialize(bytes).map_err(LmdbError::from)?)
}

/// Read and decode the value under `key`.
pub(crate) fn get<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    key: &[u8],
) -> Result<Option<T>, StoreError> {
    match db.get(txn, key).map_err(LmdbError::from)? {
        Some(bytes) => Ok(Some(decode(bytes)?)),
        None => Ok(None),
    }
}

/// Decode every value whose key starts with `prefix`, in key order.
pub(crate) fn scan_prefix<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    prefix: &[u8],
) -> Result<Vec<T>, StoreError> {
    let end = prefix_end(prefix);
    let bounds = prefix_bounds(prefix, end.as_deref());
    let iter = db.range(txn, &bounds).map_err(LmdbError::from)?;
    let mut results = Vec::new();
    for result in iter {
        let (_key, val) = result.map_err(LmdbError::from)?;
        results.push(decode(val)?);
    }
    Ok(results)
}

/// Count the keys starting with `prefix`.
pub(crate) fn count_prefix(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    prefix: &[u8],
) -> Result<u64, StoreError> {
    let end = prefix_end(prefix);
    let bounds = prefix_bounds(prefix, end.as_deref());
    let iter = db.range(txn, &bounds).map_err(LmdbError::from)?;
    let mut count = 0;
    for result in iter {
        result.map_err(LmdbError::from)?;
        count += 1;
    }
    Ok(count)
}

/// Decode every value of `db`, in key order.
pub(crate) fn scan_all<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
) -> Result<Vec<T>, StoreError> {
    let iter = db.iter(txn).map_err(LmdbError::from)?;
    let mut results = Vec::new();
    for result in iter {
        let (_key, val) = result.map_err(LmdbError::from)?;
        results.push(decode(val)?);
    }
    Ok(results)
}
