//! LMDB implementation of RecordStore.

use heed::{RoTxn, RwTxn};

use govcache_store::keys::{self, prefix_end};
use govcache_store::record::check_new_version;
use govcache_store::{MetadataStream, Record, RecordStore, StoreError};
use govcache_types::{RecordStatus, Timestamp, Token};

use crate::environment::{decode, get};
use crate::{prefix_bounds, LmdbEnvironment, LmdbError};

impl LmdbEnvironment {
    fn latest_in(&self, txn: &RoTxn, token: &Token) -> Result<Option<Record>, StoreError> {
        let prefix = keys::token_prefix(token);
        let end = prefix_end(&prefix);
        let bounds = prefix_bounds(&prefix, end.as_deref());
        let mut iter = self
            .records_db
            .rev_range(txn, &bounds)
            .map_err(LmdbError::from)?;
        match iter.next() {
            Some(result) => {
                let (_key, val) = result.map_err(LmdbError::from)?;
                Ok(Some(decode(val)?))
            }
            None => Ok(None),
        }
    }

    fn write_record(&self, wtxn: &mut RwTxn, record: &Record) -> Result<(), StoreError> {
        let key = keys::versioned(&record.token, record.version);
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        self.records_db
            .put(wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }
}

impl RecordStore for LmdbEnvironment {
    fn put_record(&self, record: &Record) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let latest = self.latest_in(&wtxn, &record.token)?;
        check_new_version(record, latest.map(|r| r.version))?;
        self.write_record(&mut wtxn, record)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn latest(&self, token: &Token) -> Result<Record, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.latest_in(&rtxn, token)?
            .ok_or_else(|| StoreError::NotFound(format!("record {token}")))
    }

    fn by_version(&self, token: &Token, version: u64) -> Result<Record, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get(&self.records_db, &rtxn, &keys::versioned(token, version))?
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
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut record: Record = get(&self.records_db, &wtxn, &keys::versioned(token, version))?
            .ok_or_else(|| StoreError::NotFound(format!("record {token} version {version}")))?;
        record.status = status;
        record.timestamp = timestamp;
        record.metadata = metadata.to_vec();
        self.write_record(&mut wtxn, &record)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn update_metadata(
        &self,
        token: &Token,
        metadata: &[MetadataStream],
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut record = self
            .latest_in(&wtxn, token)?
            .ok_or_else(|| StoreError::NotFound(format!("record {token}")))?;
        record.metadata = metadata.to_vec();
        self.write_record(&mut wtxn, &record)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn replace_records(&self, records: &[Record]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.records_db.clear(&mut wtxn).map_err(LmdbError::from)?;
        for record in records {
            let key = keys::versioned(&record.token, record.version);
            if self.records_db.get(&wtxn, &key).map_err(LmdbError::from)?.is_some() {
                return Err(StoreError::Duplicate(format!(
                    "record {} version {}",
                    record.token, record.version
                )));
            }
            self.write_record(&mut wtxn, record)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn inventory(&self) -> Result<Vec<Record>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.records_db.iter(&rtxn).map_err(LmdbError::from)?;
        // Keys sort by token then version, so the last entry of each token
        // run is its latest version.
        let mut latest: Vec<Record> = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let record: Record = decode(val)?;
            match latest.last_mut() {
                Some(last) if last.token == record.token => *last = record,
                _ => latest.push(record),
            }
        }
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let env = LmdbEnvironment::open(dir.path(), 16, 10 * 1024 * 1024)
            .expect("failed to open env");
        (dir, env)
    }

    fn record(token: &str, version: u64, status: RecordStatus) -> Record {
        Record {
            token: Token::new(token),
            version,
            status,
            timestamp: Timestamp::new(version as i64 * 10),
            merkle: format!("merkle-{version}"),
            signature: String::new(),
            metadata: Vec::new(),
            files: Vec::new(),
        }
    }

    #[test]
    fn latest_returns_highest_version() {
        let (_dir, env) = temp_env();
        env.put_record(&record("aa", 1, RecordStatus::NotReviewed)).unwrap();
        env.put_record(&record("aa", 2, RecordStatus::NotReviewed)).unwrap();
        env.put_record(&record("aa", 256, RecordStatus::Public)).unwrap();
        env.put_record(&record("ab", 1, RecordStatus::Public)).unwrap();

        assert_eq!(env.latest(&Token::new("aa")).unwrap().version, 256);
        assert_eq!(env.latest(&Token::new("ab")).unwrap().version, 1);
        assert_eq!(env.by_version(&Token::new("aa"), 2).unwrap().version, 2);
        assert!(env.latest(&Token::new("a")).unwrap_err().is_not_found());
    }

    #[test]
    fn versions_never_overwritten() {
        let (_dir, env) = temp_env();
        env.put_record(&record("aa", 2, RecordStatus::Public)).unwrap();
        assert!(env
            .put_record(&record("aa", 2, RecordStatus::Censored))
            .unwrap_err()
            .is_duplicate());
        assert!(matches!(
            env.put_record(&record("aa", 1, RecordStatus::Public)),
            Err(StoreError::StaleVersion { latest: 2, .. })
        ));
        assert_eq!(
            env.latest(&Token::new("aa")).unwrap().status,
            RecordStatus::Public
        );
    }

    #[test]
    fn update_status_touches_mutable_fields_only() {
        let (_dir, env) = temp_env();
        let token = Token::new("aa");
        env.put_record(&record("aa", 1, RecordStatus::NotReviewed)).unwrap();
        let md = vec![MetadataStream {
            id: 2,
            payload: "{}".into(),
        }];
        env.update_status(&token, 1, RecordStatus::Public, Timestamp::new(99), &md)
            .unwrap();

        let stored = env.by_version(&token, 1).unwrap();
        assert_eq!(stored.status, RecordStatus::Public);
        assert_eq!(stored.timestamp, Timestamp::new(99));
        assert_eq!(stored.metadata, md);
        assert_eq!(stored.merkle, "merkle-1");

        assert!(env
            .update_status(&token, 5, RecordStatus::Public, Timestamp::new(1), &[])
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn inventory_lists_latest_versions() {
        let (_dir, env) = temp_env();
        env.put_record(&record("aa", 1, RecordStatus::Public)).unwrap();
        env.put_record(&record("aa", 2, RecordStatus::Archived)).unwrap();
        env.put_record(&record("bb", 1, RecordStatus::Public)).unwrap();

        let inv = env.inventory().unwrap();
        assert_eq!(inv.len(), 2);
        assert_eq!(inv[0].version, 2);
        assert_eq!(inv[1].token, Token::new("bb"));

        let stats = env.inventory_stats().unwrap();
        assert_eq!(stats.count(RecordStatus::Archived), 1);
        assert_eq!(stats.count(RecordStatus::Public), 1);
    }

    #[test]
    fn concurrent_updates_do_not_lose_status() {
        let (_dir, env) = temp_env();
        let token = Token::new("aa");
        env.put_record(&record("aa", 1, RecordStatus::NotReviewed)).unwrap();

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..200 {
                    let status = if i % 2 == 0 {
                        RecordStatus::Public
                    } else {
                        RecordStatus::NotReviewed
                    };
                    env.update_status(&token, 1, status, Timestamp::new(i), &[])
                        .unwrap();
                }
                env.update_status(&token, 1, RecordStatus::Archived, Timestamp::new(500), &[])
                    .unwrap();
            });
            s.spawn(|| {
                for i in 0..200 {
                    let md = vec![MetadataStream {
                        id: 1,
                        payload: format!("{{\"n\":{i}}}"),
                    }];
                    env.update_metadata(&token, &md).unwrap();
                }
            });
        });

        let stored = env.latest(&token).unwrap();
        assert_eq!(stored.status, RecordStatus::Archived);
        assert_eq!(stored.timestamp, Timestamp::new(500));
    }

    #[test]
    fn replace_records_swaps_the_whole_mirror() {
        let (_dir, env) = temp_env();
        env.put_record(&record("aa", 1, RecordStatus::Public)).unwrap();

        env.replace_records(&[
            record("bb", 2, RecordStatus::Archived),
            record("bb", 1, RecordStatus::Public),
            record("cc", 1, RecordStatus::Public),
        ])
        .unwrap();
        assert!(env.latest(&Token::new("aa")).unwrap_err().is_not_found());
        assert_eq!(env.latest(&Token::new("bb")).unwrap().version, 2);
        assert_eq!(env.inventory().unwrap().len(), 2);

        let err = env
            .replace_records(&[
                record("dd", 1, RecordStatus::Public),
                record("dd", 1, RecordStatus::Public),
            ])
            .unwrap_err();
        assert!(err.is_duplicate());
        // The failed replacement rolled back.
        assert_eq!(env.inventory().unwrap().len(), 2);
    }
}
