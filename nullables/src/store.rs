//! Nullable store: thread-safe in-memory storage for testing.
//!
//! All tables live in one [`State`] behind a single reader/writer lock. A
//! batch stages its writes against a snapshot so that errors surface at the
//! call that caused them, then replays them onto the live state under the
//! write lock at commit. Either every write of a batch lands or none does.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use govcache_store::keys;
use govcache_store::record::check_new_version;
use govcache_store::{
    AuthorizeVoteRow, CastVoteRow, CommentLikeRow, CommentRow, MetadataStream, PluginBatch,
    PluginStore, Record, RecordStore, StartVoteRow, StoreError, VersionRecord, VoteResultsRow,
};
use govcache_types::{RecordStatus, Timestamp, Token};

#[derive(Clone, Default)]
struct State {
    records: BTreeMap<Vec<u8>, Record>,
    comments: BTreeMap<Vec<u8>, CommentRow>,
    comment_likes: BTreeMap<Vec<u8>, CommentLikeRow>,
    like_seq: u64,
    authorize_votes: BTreeMap<Vec<u8>, AuthorizeVoteRow>,
    start_votes: BTreeMap<Vec<u8>, StartVoteRow>,
    cast_votes: BTreeMap<Vec<u8>, CastVoteRow>,
    cast_vote_bits: BTreeSet<Vec<u8>>,
    vote_results: BTreeMap<Vec<u8>, VoteResultsRow>,
    versions: BTreeMap<String, VersionRecord>,
}

fn scan<'a, T: Clone + 'a>(map: &'a BTreeMap<Vec<u8>, T>, prefix: &'a [u8]) -> Vec<T> {
    map.range(prefix.to_vec()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(_, v)| v.clone())
        .collect()
}

fn insert_new<T>(
    map: &mut BTreeMap<Vec<u8>, T>,
    key: Vec<u8>,
    value: T,
    what: impl FnOnce() -> String,
) -> Result<(), StoreError> {
    if map.contains_key(&key) {
        return Err(StoreError::Duplicate(what()));
    }
    map.insert(key, value);
    Ok(())
}

/// A staged plugin table write.
#[derive(Clone)]
enum Op {
    InsertComment(CommentRow),
    CensorComment(Token, String),
    AppendLike(CommentLikeRow),
    DeleteAuthorizeVote(Token, u64),
    InsertAuthorizeVote(AuthorizeVoteRow),
    InsertStartVote(StartVoteRow),
    InsertCastVote(CastVoteRow),
    InsertVoteResults(VoteResultsRow),
}

impl State {
    fn latest_record(&self, token: &Token) -> Option<&Record> {
        let prefix = keys::token_prefix(token);
        self.records
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(_, v)| v)
            .last()
    }

    fn apply(&mut self, op: &Op) -> Result<(), StoreError> {
        match op {
            Op::InsertComment(row) => insert_new(&mut self.comments, row.key(), row.clone(), || {
                format!("comment {} on {}", row.comment_id, row.token)
            }),
            Op::CensorComment(token, comment_id) => {
                let row = self
                    .comments
                    .get_mut(&keys::named(token, comment_id))
                    .ok_or_else(|| {
                        StoreError::NotFound(format!("comment {comment_id} on {token}"))
                    })?;
                row.censor();
                Ok(())
            }
            Op::AppendLike(row) => {
                let key = keys::comment_like(&row.token, &row.comment_id, self.like_seq);
                self.like_seq += 1;
                self.comment_likes.insert(key, row.clone());
                Ok(())
            }
            Op::DeleteAuthorizeVote(token, version) => {
                self.authorize_votes.remove(&keys::versioned(token, *version));
                Ok(())
            }
            Op::InsertAuthorizeVote(row) => {
                insert_new(&mut self.authorize_votes, row.key(), row.clone(), || {
                    format!("authorize vote for {} version {}", row.token, row.version)
                })
            }
            Op::InsertStartVote(row) => insert_new(
                &mut self.start_votes,
                keys::token_prefix(&row.token),
                row.clone(),
                || format!("start vote for {}", row.token),
            ),
            Op::InsertCastVote(row) => {
                insert_new(&mut self.cast_votes, row.key(), row.clone(), || {
                    format!("cast vote by ticket {} on {}", row.ticket, row.token)
                })?;
                self.cast_vote_bits.insert(row.token_vote_bit());
                Ok(())
            }
            Op::InsertVoteResults(row) => insert_new(
                &mut self.vote_results,
                keys::token_prefix(&row.token),
                row.clone(),
                || format!("vote results for {}", row.token),
            ),
        }
    }
}

/// In-memory record mirror plus plugin tables.
#[derive(Default)]
pub struct NullCacheStore {
    state: RwLock<State>,
}

impl NullCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
    }
}

impl RecordStore for NullCacheStore {
    fn put_record(&self, record: &Record) -> Result<(), StoreError> {
        let mut state = self.write()?;
        check_new_version(record, state.latest_record(&record.token).map(|r| r.version))?;
        state.records.insert(
            keys::versioned(&record.token, record.version),
            record.clone(),
        );
        Ok(())
    }

    fn latest(&self, token: &Token) -> Result<Record, StoreError> {
        self.read()?
            .latest_record(token)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("record {token}")))
    }

    fn by_version(&self, token: &Token, version: u64) -> Result<Record, StoreError> {
        self.read()?
            .records
            .get(&keys::versioned(token, version))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("record {token} version {version}")))
    }

    fn update_status(
        &self,
        token: &Token,
        version: u64,
        status: RecordStatus,
        timestamp: Timestamp,
        metadata: &[MetadataStream],
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let record = state
            .records
            .get_mut(&keys::versioned(token, version))
            .ok_or_else(|| StoreError::NotFound(format!("record {token} version {version}")))?;
        record.status = status;
        record.timestamp = timestamp;
        record.metadata = metadata.to_vec();
        Ok(())
    }

    fn update_metadata(
        &self,
        token: &Token,
        metadata: &[MetadataStream],
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let version = state
            .latest_record(token)
            .map(|r| r.version)
            .ok_or_else(|| StoreError::NotFound(format!("record {token}")))?;
        if let Some(record) = state.records.get_mut(&keys::versioned(token, version)) {
            record.metadata = metadata.to_vec();
        }
        Ok(())
    }

    fn replace_records(&self, records: &[Record]) -> Result<(), StoreError> {
        let mut replaced = BTreeMap::new();
        for record in records {
            let key = keys::versioned(&record.token, record.version);
            if replaced.insert(key, record.clone()).is_some() {
                return Err(StoreError::Duplicate(format!(
                    "record {} version {}",
                    record.token, record.version
                )));
            }
        }
        self.write()?.records = replaced;
        Ok(())
    }

    fn inventory(&self) -> Result<Vec<Record>, StoreError> {
        let state = self.read()?;
        let mut latest: Vec<Record> = Vec::new();
        for record in state.records.values() {
            match latest.last_mut() {
                Some(last) if last.token == record.token => *last = record.clone(),
                _ => latest.push(record.clone()),
            }
        }
        Ok(latest)
    }
}

/// Write batch over a [`NullCacheStore`].
pub struct NullBatch<'a> {
    store: &'a NullCacheStore,
    staged: State,
    ops: Vec<Op>,
}

impl NullBatch<'_> {
    fn stage(&mut self, op: Op) -> Result<(), StoreError> {
        self.staged.apply(&op)?;
        self.ops.push(op);
        Ok(())
    }
}

impl PluginBatch for NullBatch<'_> {
    fn insert_comment(&mut self, row: &CommentRow) -> Result<(), StoreError> {
        self.stage(Op::InsertComment(row.clone()))
    }

    fn censor_comment(&mut self, token: &Token, comment_id: &str) -> Result<(), StoreError> {
        self.stage(Op::CensorComment(token.clone(), comment_id.to_string()))
    }

    fn append_comment_like(&mut self, row: &CommentLikeRow) -> Result<(), StoreError> {
        self.stage(Op::AppendLike(row.clone()))
    }

    fn delete_authorize_vote(&mut self, token: &Token, version: u64) -> Result<(), StoreError> {
        self.stage(Op::DeleteAuthorizeVote(token.clone(), version))
    }

    fn insert_authorize_vote(&mut self, row: &AuthorizeVoteRow) -> Result<(), StoreError> {
        self.stage(Op::InsertAuthorizeVote(row.clone()))
    }

    fn insert_start_vote(&mut self, row: &StartVoteRow) -> Result<(), StoreError> {
        self.stage(Op::InsertStartVote(row.clone()))
    }

    fn insert_cast_vote(&mut self, row: &CastVoteRow) -> Result<(), StoreError> {
        self.stage(Op::InsertCastVote(row.clone()))
    }

    fn insert_vote_results(&mut self, row: &VoteResultsRow) -> Result<(), StoreError> {
        self.stage(Op::InsertVoteResults(row.clone()))
    }

    fn commit(self) -> Result<(), StoreError> {
        let mut live = self.store.write()?;
        let mut next = live.clone();
        for op in &self.ops {
            next.apply(op)?;
        }
        *live = next;
        Ok(())
    }
}

impl PluginStore for NullCacheStore {
    type Batch<'a> = NullBatch<'a>;

    fn begin(&self) -> Result<NullBatch<'_>, StoreError> {
        let staged = self.read()?.clone();
        Ok(NullBatch {
            store: self,
            staged,
            ops: Vec::new(),
        })
    }

    fn comment(&self, token: &Token, comment_id: &str) -> Result<Option<CommentRow>, StoreError> {
        Ok(self
            .read()?
            .comments
            .get(&keys::named(token, comment_id))
            .cloned())
    }

    fn comments(&self, token: &Token) -> Result<Vec<CommentRow>, StoreError> {
        Ok(scan(&self.read()?.comments, &keys::token_prefix(token)))
    }

    fn all_comments(&self) -> Result<Vec<CommentRow>, StoreError> {
        Ok(self.read()?.comments.values().cloned().collect())
    }

    fn comment_likes(
        &self,
        token: &Token,
        comment_id: &str,
    ) -> Result<Vec<CommentLikeRow>, StoreError> {
        Ok(scan(
            &self.read()?.comment_likes,
            &keys::comment_like_prefix(token, comment_id),
        ))
    }

    fn proposal_comment_likes(&self, token: &Token) -> Result<Vec<CommentLikeRow>, StoreError> {
        Ok(scan(&self.read()?.comment_likes, &keys::token_prefix(token)))
    }

    fn all_comment_likes(&self) -> Result<Vec<CommentLikeRow>, StoreError> {
        Ok(self.read()?.comment_likes.values().cloned().collect())
    }

    fn authorize_vote(
        &self,
        token: &Token,
        version: u64,
    ) -> Result<Option<AuthorizeVoteRow>, StoreError> {
        Ok(self
            .read()?
            .authorize_votes
            .get(&keys::versioned(token, version))
            .cloned())
    }

    fn all_authorize_votes(&self) -> Result<Vec<AuthorizeVoteRow>, StoreError> {
        Ok(self.read()?.authorize_votes.values().cloned().collect())
    }

    fn start_vote(&self, token: &Token) -> Result<Option<StartVoteRow>, StoreError> {
        Ok(self
            .read()?
            .start_votes
            .get(&keys::token_prefix(token))
            .cloned())
    }

    fn all_start_votes(&self) -> Result<Vec<StartVoteRow>, StoreError> {
        Ok(self.read()?.start_votes.values().cloned().collect())
    }

    fn cast_votes(&self, token: &Token) -> Result<Vec<CastVoteRow>, StoreError> {
        Ok(scan(&self.read()?.cast_votes, &keys::token_prefix(token)))
    }

    fn all_cast_votes(&self) -> Result<Vec<CastVoteRow>, StoreError> {
        Ok(self.read()?.cast_votes.values().cloned().collect())
    }

    fn count_cast_votes(&self, token: &Token, vote_bit: &str) -> Result<u64, StoreError> {
        let prefix = keys::vote_bit_prefix(token, vote_bit);
        let state = self.read()?;
        let count = state
            .cast_vote_bits
            .range(prefix.clone()..)
            .take_while(|k| k.starts_with(&prefix))
            .count();
        Ok(count as u64)
    }

    fn vote_results(&self, token: &Token) -> Result<Option<VoteResultsRow>, StoreError> {
        Ok(self
            .read()?
            .vote_results
            .get(&keys::token_prefix(token))
            .cloned())
    }

    fn all_vote_results(&self) -> Result<Vec<VoteResultsRow>, StoreError> {
        Ok(self.read()?.vote_results.values().cloned().collect())
    }

    fn version_record(&self, plugin_id: &str) -> Result<Option<VersionRecord>, StoreError> {
        Ok(self.read()?.versions.get(plugin_id).cloned())
    }

    fn create_tables(&self, marker: &VersionRecord) -> Result<(), StoreError> {
        self.write()?
            .versions
            .entry(marker.id.clone())
            .or_insert_with(|| marker.clone());
        Ok(())
    }

    fn drop_tables(&self, plugin_id: &str) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let records = std::mem::take(&mut state.records);
        let mut versions = std::mem::take(&mut state.versions);
        versions.remove(plugin_id);
        *state = State {
            records,
            versions,
            ..State::default()
        };
        Ok(())
    }

    fn delete_version_record(&self, plugin_id: &str) -> Result<(), StoreError> {
        self.write()?.versions.remove(plugin_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govcache_types::LikeAction;

    fn cast(ticket: &str, bit: &str) -> CastVoteRow {
        CastVoteRow {
            token: Token::new("aa"),
            ticket: ticket.into(),
            vote_bit: bit.into(),
            signature: String::new(),
        }
    }

    #[test]
    fn uncommitted_batch_is_invisible() {
        let store = NullCacheStore::new();
        let mut batch = store.begin().unwrap();
        batch.insert_cast_vote(&cast("t1", "1")).unwrap();
        assert!(store.cast_votes(&Token::new("aa")).unwrap().is_empty());
        drop(batch);
        assert!(store.all_cast_votes().unwrap().is_empty());
    }

    #[test]
    fn duplicate_ticket_fails_at_insert() {
        let store = NullCacheStore::new();
        let mut batch = store.begin().unwrap();
        batch.insert_cast_vote(&cast("t1", "1")).unwrap();
        assert!(batch
            .insert_cast_vote(&cast("t1", "2"))
            .unwrap_err()
            .is_duplicate());
    }

    #[test]
    fn racing_batches_do_not_both_commit() {
        let store = NullCacheStore::new();
        let mut first = store.begin().unwrap();
        let mut second = store.begin().unwrap();
        first.insert_cast_vote(&cast("t1", "1")).unwrap();
        second.insert_cast_vote(&cast("t2", "1")).unwrap();
        second.insert_cast_vote(&cast("t1", "2")).unwrap();
        first.commit().unwrap();
        assert!(second.commit().unwrap_err().is_duplicate());

        let votes = store.cast_votes(&Token::new("aa")).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(store.count_cast_votes(&Token::new("aa"), "2").unwrap(), 0);
    }

    #[test]
    fn likes_scoped_to_comment() {
        let store = NullCacheStore::new();
        let like = |id: &str| CommentLikeRow {
            token: Token::new("aa"),
            comment_id: id.into(),
            action: LikeAction::Upvote,
            signature: String::new(),
            public_key: "pk".into(),
        };
        let mut batch = store.begin().unwrap();
        batch.append_comment_like(&like("1")).unwrap();
        batch.append_comment_like(&like("11")).unwrap();
        batch.commit().unwrap();
        assert_eq!(store.comment_likes(&Token::new("aa"), "1").unwrap().len(), 1);
        assert_eq!(
            store.proposal_comment_likes(&Token::new("aa")).unwrap().len(),
            2
        );
    }

    #[test]
    fn drop_tables_keeps_records() {
        let store = NullCacheStore::new();
        store
            .put_record(&Record {
                token: Token::new("aa"),
                version: 1,
                status: RecordStatus::Public,
                timestamp: Timestamp::new(1),
                merkle: String::new(),
                signature: String::new(),
                metadata: Vec::new(),
                files: Vec::new(),
            })
            .unwrap();
        store
            .create_tables(&VersionRecord::new("governance", "1.1", Timestamp::new(1)))
            .unwrap();
        let mut batch = store.begin().unwrap();
        batch.insert_cast_vote(&cast("t1", "1")).unwrap();
        batch.commit().unwrap();

        store.drop_tables("governance").unwrap();
        assert!(store.version_record("governance").unwrap().is_none());
        assert!(store.all_cast_votes().unwrap().is_empty());
        assert_eq!(store.inventory().unwrap().len(), 1);
    }

    #[test]
    fn replace_records_is_all_or_nothing() {
        let record = |token: &str, version: u64| Record {
            token: Token::new(token),
            version,
            status: RecordStatus::Public,
            timestamp: Timestamp::new(1),
            merkle: String::new(),
            signature: String::new(),
            metadata: Vec::new(),
            files: Vec::new(),
        };
        let store = NullCacheStore::new();
        store.put_record(&record("aa", 1)).unwrap();

        store
            .replace_records(&[record("bb", 3), record("bb", 1)])
            .unwrap();
        assert!(store.try_latest(&Token::new("aa")).unwrap().is_none());
        assert_eq!(store.latest(&Token::new("bb")).unwrap().version, 3);

        assert!(store
            .replace_records(&[record("cc", 1), record("cc", 1)])
            .unwrap_err()
            .is_duplicate());
        assert_eq!(store.latest(&Token::new("bb")).unwrap().version, 3);
    }
}
