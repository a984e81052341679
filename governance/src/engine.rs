//! Vote tally engine: lazy result materialization and the reads that
//! depend on it.

use tracing::{debug, info};

use govcache_store::{
    CacheStore, PluginBatch, PluginStore, RecordStore, StartVoteRow, StoreError,
    VoteOptionResultRow, VoteResultsRow,
};
use govcache_types::{RecordStatus, Token};

use crate::error::GovernanceError;
use crate::lifecycle::VoteStatus;
use crate::tally::{count_options, is_approved};

/// Proposal tokens grouped by voting stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenInventory {
    /// Public, vote not started. Newest first.
    pub pre: Vec<Token>,
    /// Vote in progress. Highest end height first.
    pub active: Vec<Token>,
    /// Highest end height first.
    pub approved: Vec<Token>,
    /// Highest end height first.
    pub rejected: Vec<Token>,
    /// Archived. Newest first.
    pub abandoned: Vec<Token>,
}

/// Vote state of one proposal as reported to clients.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoteSummary {
    pub authorized: bool,
    /// `None` until the vote is started.
    pub end_height: Option<u64>,
    pub eligible_ticket_count: u64,
    pub quorum_percentage: u32,
    pub pass_percentage: u32,
    pub results: Vec<VoteOptionResultRow>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VoteTallyEngine;

impl VoteTallyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Materialize results for every vote that ended at or before
    /// `best_block` and has none yet. Returns the tokens materialized by
    /// this call.
    ///
    /// Results are write-once. A token materialized concurrently by another
    /// caller is skipped.
    pub fn load_vote_results<S: PluginStore>(
        &self,
        store: &S,
        best_block: u64,
    ) -> Result<Vec<Token>, GovernanceError> {
        let pending = store.unmaterialized_ended_votes(best_block)?;
        let mut loaded = Vec::with_capacity(pending.len());
        for start_vote in pending {
            let results = Self::compute_results(store, &start_vote)?;
            match Self::insert_results(store, &results) {
                Ok(()) => {
                    info!(
                        token = %results.token,
                        approved = results.approved,
                        total_votes = results.total_votes(),
                        end_height = start_vote.end_height,
                        "vote results materialized"
                    );
                    loaded.push(results.token);
                }
                Err(StoreError::Duplicate(_)) => {
                    debug!(token = %start_vote.token, "vote results already materialized");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(loaded)
    }

    fn compute_results<S: PluginStore>(
        store: &S,
        start_vote: &StartVoteRow,
    ) -> Result<VoteResultsRow, StoreError> {
        let results = count_options(start_vote, |bit| {
            store.count_cast_votes(&start_vote.token, bit)
        })?;
        Ok(VoteResultsRow {
            token: start_vote.token.clone(),
            approved: is_approved(start_vote, &results),
            results,
        })
    }

    fn insert_results<S: PluginStore>(store: &S, results: &VoteResultsRow) -> Result<(), StoreError> {
        let mut batch = store.begin()?;
        batch.insert_vote_results(results)?;
        batch.commit()
    }

    /// Group proposals by voting stage.
    ///
    /// Fails with [`GovernanceError::VoteResultsNotLoaded`] while any vote
    /// that ended at or before `best_block` lacks results: callers must run
    /// [`Self::load_vote_results`] first.
    pub fn token_inventory<S: CacheStore>(
        &self,
        store: &S,
        best_block: u64,
    ) -> Result<TokenInventory, GovernanceError> {
        if let Some(missing) = store.unmaterialized_ended_votes(best_block)?.into_iter().next() {
            return Err(GovernanceError::VoteResultsNotLoaded {
                token: missing.token,
                end_height: missing.end_height,
            });
        }

        let start_votes = store.all_start_votes()?;

        let mut active: Vec<&StartVoteRow> = start_votes
            .iter()
            .filter(|sv| !sv.has_ended(best_block))
            .collect();
        active.sort_by(|a, b| b.end_height.cmp(&a.end_height));

        let mut approved = Vec::new();
        let mut rejected = Vec::new();
        let mut finished: Vec<(u64, VoteResultsRow)> = store
            .all_vote_results()?
            .into_iter()
            .map(|vr| {
                let end_height = start_votes
                    .iter()
                    .find(|sv| sv.token == vr.token)
                    .map(|sv| sv.end_height)
                    .unwrap_or(0);
                (end_height, vr)
            })
            .collect();
        finished.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, vr) in finished {
            if vr.approved {
                approved.push(vr.token);
            } else {
                rejected.push(vr.token);
            }
        }

        let mut records = store.inventory()?;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let mut pre = Vec::new();
        let mut abandoned = Vec::new();
        for record in records {
            match record.status {
                RecordStatus::Public if !start_votes.iter().any(|sv| sv.token == record.token) => {
                    pre.push(record.token)
                }
                RecordStatus::Archived => abandoned.push(record.token),
                _ => {}
            }
        }

        Ok(TokenInventory {
            pre,
            active: active.into_iter().map(|sv| sv.token.clone()).collect(),
            approved,
            rejected,
            abandoned,
        })
    }

    /// Vote state of `token`.
    ///
    /// Stops looking once a dependency is absent: without an authorize vote
    /// for the latest record version nothing else is reported, and without a
    /// start vote no results are. Counts are taken from materialized results
    /// when present, otherwise live from the cast votes.
    pub fn vote_summary<S: CacheStore>(
        &self,
        store: &S,
        token: &Token,
    ) -> Result<VoteSummary, GovernanceError> {
        let record = store
            .try_latest(token)?
            .ok_or_else(|| GovernanceError::RecordNotFound(token.clone()))?;

        let Some(authorize_vote) = store.authorize_vote(token, record.version)? else {
            return Ok(VoteSummary::default());
        };
        let mut summary = VoteSummary {
            authorized: authorize_vote.is_authorized(),
            ..VoteSummary::default()
        };

        let Some(start_vote) = store.start_vote(token)? else {
            return Ok(summary);
        };
        summary.end_height = Some(start_vote.end_height);
        summary.eligible_ticket_count = start_vote.eligible_ticket_count;
        summary.quorum_percentage = start_vote.quorum_percentage;
        summary.pass_percentage = start_vote.pass_percentage;

        summary.results = match store.vote_results(token)? {
            Some(results) => results.results,
            None => count_options(&start_vote, |bit| store.count_cast_votes(token, bit))?,
        };
        Ok(summary)
    }

    /// Lifecycle stage of `token` at `best_block`.
    pub fn vote_status<S: CacheStore>(
        &self,
        store: &S,
        token: &Token,
        best_block: u64,
    ) -> Result<VoteStatus, GovernanceError> {
        if store.vote_results(token)?.is_some() {
            return Ok(VoteStatus::Resulted);
        }
        if let Some(start_vote) = store.start_vote(token)? {
            return Ok(if start_vote.has_ended(best_block) {
                VoteStatus::VotingEnded
            } else {
                VoteStatus::VotingActive
            });
        }
        let record = store
            .try_latest(token)?
            .ok_or_else(|| GovernanceError::RecordNotFound(token.clone()))?;
        let authorized = store
            .authorize_vote(token, record.version)?
            .is_some_and(|av| av.is_authorized());
        Ok(if authorized {
            VoteStatus::Authorized
        } else {
            VoteStatus::Unauthorized
        })
    }
}
