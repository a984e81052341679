//! Command dispatcher: routes a plugin command to its handler.
//!
//! Write-through commands carry the authoritative store's reply. Both
//! payloads are decoded, the derived rows are written in one batch, and the
//! reply payload is returned unchanged. A failed write leaves the cache
//! behind the authoritative store; it catches up through a rebuild.
//!
//! Read-only commands decode the command payload, query the tables and
//! encode a fresh reply.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use govcache_governance::{LikeTally, VoteTallyEngine};
use govcache_messages::{
    AuthorizeVote, AuthorizeVoteReply, Ballot, BallotReply, CensorComment, CensorCommentReply,
    CommentLikes, CommentLikesReply, GetComment, GetCommentReply, GetComments, GetCommentsReply,
    GetProposalCommentsLikes, GetProposalCommentsLikesReply, Inventory, InventoryReply,
    LikeComment, LikeCommentReply, LoadVoteResults, LoadVoteResultsReply, NewComment,
    NewCommentReply, Payload, PluginCommand, ProposalVotes, ProposalVotesReply, StartVote,
    StartVoteReply, TokenInventory, VoteDetails, VoteDetailsReply, VoteSummary,
};
use govcache_store::{CacheStore, PluginBatch, PluginStore, RecordStore};

use crate::convert;
use crate::error::{CacheError, StoreContext};
use crate::metrics::CacheMetrics;
use crate::tracing_spans::plugin_exec_span;

pub struct Dispatcher<S> {
    store: Arc<S>,
    engine: VoteTallyEngine,
    metrics: Arc<CacheMetrics>,
}

impl<S: CacheStore> Dispatcher<S> {
    pub fn new(store: Arc<S>, metrics: Arc<CacheMetrics>) -> Self {
        Self {
            store,
            engine: VoteTallyEngine::new(),
            metrics,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Execute a command given by wire name.
    ///
    /// Unknown names fail with [`CacheError::InvalidPluginCommand`].
    pub fn exec_named(
        &self,
        command: &str,
        cmd_payload: &str,
        reply_payload: &str,
    ) -> Result<String, CacheError> {
        let command: PluginCommand = command.parse()?;
        self.exec(command, cmd_payload, reply_payload)
    }

    /// Execute one command. `reply_payload` is only read for write-through
    /// commands.
    pub fn exec(
        &self,
        command: PluginCommand,
        cmd_payload: &str,
        reply_payload: &str,
    ) -> Result<String, CacheError> {
        let _span = plugin_exec_span(command.as_str()).entered();
        trace!(write_through = command.is_write_through(), "exec");
        let started = Instant::now();

        let result = self.dispatch(command, cmd_payload, reply_payload);

        self.metrics
            .exec_latency_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        self.metrics
            .commands_executed
            .with_label_values(&[command.as_str()])
            .inc();
        if let Err(e) = &result {
            self.metrics
                .command_failures
                .with_label_values(&[command.as_str()])
                .inc();
            debug!(error = %e, "command failed");
        }
        result
    }

    fn dispatch(
        &self,
        command: PluginCommand,
        cmd_payload: &str,
        reply_payload: &str,
    ) -> Result<String, CacheError> {
        match command {
            PluginCommand::NewComment => self.new_comment(cmd_payload, reply_payload),
            PluginCommand::LikeComment => self.like_comment(cmd_payload, reply_payload),
            PluginCommand::CensorComment => self.censor_comment(cmd_payload, reply_payload),
            PluginCommand::GetComment => self.get_comment(cmd_payload),
            PluginCommand::GetComments => self.get_comments(cmd_payload),
            PluginCommand::CommentLikes => self.comment_likes(cmd_payload),
            PluginCommand::ProposalCommentsLikes => self.proposal_comments_likes(cmd_payload),
            PluginCommand::AuthorizeVote => self.authorize_vote(cmd_payload, reply_payload),
            PluginCommand::StartVote => self.start_vote(cmd_payload, reply_payload),
            PluginCommand::VoteDetails => self.vote_details(cmd_payload),
            PluginCommand::Ballot => self.ballot(cmd_payload, reply_payload),
            PluginCommand::ProposalVotes => self.proposal_votes(cmd_payload),
            PluginCommand::BestBlock => Ok(String::new()),
            PluginCommand::Inventory => {
                Inventory::decode(cmd_payload)?;
                Ok(self.inventory()?.encode())
            }
            PluginCommand::LoadVoteResults => self.load_vote_results(cmd_payload),
            PluginCommand::TokenInventory => self.token_inventory(cmd_payload),
            PluginCommand::VoteSummary => self.vote_summary(cmd_payload),
        }
    }

    // ── Write-through commands ──────────────────────────────────────────

    fn new_comment(&self, cmd_payload: &str, reply_payload: &str) -> Result<String, CacheError> {
        let nc = NewComment::decode(cmd_payload)?;
        let ncr = NewCommentReply::decode(reply_payload)?;
        let row = convert::new_comment_row(&nc, &ncr);

        let mut batch = self.store.begin().context("begin new comment")?;
        batch
            .insert_comment(&row)
            .with_context(|| format!("insert comment {} on {}", row.comment_id, row.token))?;
        batch.commit().context("commit new comment")?;
        Ok(reply_payload.to_string())
    }

    fn like_comment(&self, cmd_payload: &str, reply_payload: &str) -> Result<String, CacheError> {
        let lc = LikeComment::decode(cmd_payload)?;
        LikeCommentReply::decode(reply_payload)?;

        let mut batch = self.store.begin().context("begin like comment")?;
        batch
            .append_comment_like(&convert::like_row(&lc))
            .with_context(|| format!("append like on comment {} of {}", lc.comment_id, lc.token))?;
        batch.commit().context("commit like comment")?;
        Ok(reply_payload.to_string())
    }

    fn censor_comment(&self, cmd_payload: &str, reply_payload: &str) -> Result<String, CacheError> {
        let cc = CensorComment::decode(cmd_payload)?;
        CensorCommentReply::decode(reply_payload)?;

        let mut batch = self.store.begin().context("begin censor comment")?;
        batch
            .censor_comment(&cc.token, &cc.comment_id)
            .with_context(|| format!("censor comment {} on {}", cc.comment_id, cc.token))?;
        batch.commit().context("commit censor comment")?;
        Ok(reply_payload.to_string())
    }

    /// Replace any existing row for the same (token, version) in the same
    /// batch, so readers see exactly one row before and after.
    fn authorize_vote(&self, cmd_payload: &str, reply_payload: &str) -> Result<String, CacheError> {
        let av = AuthorizeVote::decode(cmd_payload)?;
        let avr = AuthorizeVoteReply::decode(reply_payload)?;
        let row = convert::authorize_vote_row(&av, &avr);

        let mut batch = self.store.begin().context("begin authorize vote")?;
        batch
            .delete_authorize_vote(&row.token, row.version)
            .with_context(|| format!("delete authorize vote {} version {}", row.token, row.version))?;
        batch
            .insert_authorize_vote(&row)
            .with_context(|| format!("insert authorize vote {} version {}", row.token, row.version))?;
        batch.commit().context("commit authorize vote")?;
        Ok(reply_payload.to_string())
    }

    fn start_vote(&self, cmd_payload: &str, reply_payload: &str) -> Result<String, CacheError> {
        let sv = StartVote::decode(cmd_payload)?;
        let svr = StartVoteReply::decode(reply_payload)?;
        let row = convert::start_vote_row(&sv, &svr);

        let mut batch = self.store.begin().context("begin start vote")?;
        batch
            .insert_start_vote(&row)
            .with_context(|| format!("insert start vote {}", row.token))?;
        batch.commit().context("commit start vote")?;
        Ok(reply_payload.to_string())
    }

    /// All cast votes of a ballot land together or not at all.
    fn ballot(&self, cmd_payload: &str, reply_payload: &str) -> Result<String, CacheError> {
        let ballot = Ballot::decode(cmd_payload)?;
        BallotReply::decode(reply_payload)?;

        let mut batch = self.store.begin().context("begin ballot")?;
        for vote in &ballot.votes {
            batch
                .insert_cast_vote(&convert::cast_vote_row(vote))
                .with_context(|| format!("insert cast vote {} on {}", vote.ticket, vote.token))?;
        }
        batch.commit().context("commit ballot")?;
        Ok(reply_payload.to_string())
    }

    // ── Read-only commands ──────────────────────────────────────────────

    fn get_comment(&self, cmd_payload: &str) -> Result<String, CacheError> {
        let gc = GetComment::decode(cmd_payload)?;
        let row = self
            .store
            .comment(&gc.token, &gc.comment_id)
            .context("lookup comment")?
            .ok_or_else(|| {
                CacheError::RecordNotFound(format!("comment {} on {}", gc.comment_id, gc.token))
            })?;
        let likes = self
            .store
            .comment_likes(&gc.token, &gc.comment_id)
            .context("lookup comment likes")?;
        let reply = GetCommentReply {
            comment: convert::comment(&row, LikeTally::from_likes(&likes)),
        };
        Ok(reply.encode())
    }

    fn get_comments(&self, cmd_payload: &str) -> Result<String, CacheError> {
        let gc = GetComments::decode(cmd_payload)?;
        let rows = self.store.comments(&gc.token).context("lookup comments")?;
        let likes = self
            .store
            .proposal_comment_likes(&gc.token)
            .context("lookup comment likes")?;
        let tallies = LikeTally::by_comment(&likes);
        let reply = GetCommentsReply {
            comments: rows
                .iter()
                .map(|row| {
                    let tally = tallies
                        .get(row.comment_id.as_str())
                        .copied()
                        .unwrap_or_default();
                    convert::comment(row, tally)
                })
                .collect(),
        };
        Ok(reply.encode())
    }

    fn comment_likes(&self, cmd_payload: &str) -> Result<String, CacheError> {
        let cl = CommentLikes::decode(cmd_payload)?;
        let likes = self
            .store
            .comment_likes(&cl.token, &cl.comment_id)
            .context("lookup comment likes")?;
        let reply = CommentLikesReply {
            comment_likes: likes.iter().map(convert::like).collect(),
        };
        Ok(reply.encode())
    }

    fn proposal_comments_likes(&self, cmd_payload: &str) -> Result<String, CacheError> {
        let gpcl = GetProposalCommentsLikes::decode(cmd_payload)?;
        let likes = self
            .store
            .proposal_comment_likes(&gpcl.token)
            .context("lookup proposal comment likes")?;
        let reply = GetProposalCommentsLikesReply {
            comments_likes: likes.iter().map(convert::like).collect(),
        };
        Ok(reply.encode())
    }

    /// Authorization of the latest record version plus the start vote, each
    /// absent when not found. Fails only when the record itself is unknown.
    fn vote_details(&self, cmd_payload: &str) -> Result<String, CacheError> {
        let vd = VoteDetails::decode(cmd_payload)?;
        let record = self
            .store
            .try_latest(&vd.token)
            .context("lookup record")?
            .ok_or_else(|| CacheError::RecordNotFound(format!("record {}", vd.token)))?;
        let authorize_vote = self
            .store
            .authorize_vote(&vd.token, record.version)
            .context("lookup authorize vote")?
            .map(|row| convert::authorize_vote(&row).0);
        let start_vote = self
            .store
            .start_vote(&vd.token)
            .context("lookup start vote")?
            .map(|row| convert::start_vote(&row));

        let (start_vote, start_vote_reply) = match start_vote {
            Some(tuple) => (Some(tuple.start_vote), Some(tuple.start_vote_reply)),
            None => (None, None),
        };
        let reply = VoteDetailsReply {
            authorize_vote,
            start_vote,
            start_vote_reply,
        };
        Ok(reply.encode())
    }

    fn proposal_votes(&self, cmd_payload: &str) -> Result<String, CacheError> {
        let pv = ProposalVotes::decode(cmd_payload)?;
        let start_vote = self
            .store
            .start_vote(&pv.token)
            .context("lookup start vote")?
            .map(|row| convert::start_vote(&row).start_vote);
        let cast_votes = self
            .store
            .cast_votes(&pv.token)
            .context("lookup cast votes")?;
        let reply = ProposalVotesReply {
            start_vote,
            cast_votes: cast_votes.iter().map(convert::cast_vote).collect(),
        };
        Ok(reply.encode())
    }

    /// Every plugin-owned entity, in the shape [`crate::RebuildController::build`]
    /// replays.
    pub fn inventory(&self) -> Result<InventoryReply, CacheError> {
        let mut comments = Vec::new();
        for row in self.store.all_comments().context("list comments")? {
            let likes = self
                .store
                .comment_likes(&row.token, &row.comment_id)
                .context("lookup comment likes")?;
            comments.push(convert::comment(&row, LikeTally::from_likes(&likes)));
        }

        let like_comments = self
            .store
            .all_comment_likes()
            .context("list comment likes")?
            .iter()
            .map(convert::like)
            .collect();

        let (authorize_votes, authorize_vote_replies) = self
            .store
            .all_authorize_votes()
            .context("list authorize votes")?
            .iter()
            .map(convert::authorize_vote)
            .unzip();

        let start_vote_tuples = self
            .store
            .all_start_votes()
            .context("list start votes")?
            .iter()
            .map(convert::start_vote)
            .collect();

        let cast_votes = self
            .store
            .all_cast_votes()
            .context("list cast votes")?
            .iter()
            .map(convert::cast_vote)
            .collect();

        Ok(InventoryReply {
            comments,
            like_comments,
            authorize_votes,
            authorize_vote_replies,
            start_vote_tuples,
            cast_votes,
        })
    }

    fn load_vote_results(&self, cmd_payload: &str) -> Result<String, CacheError> {
        let lvr = LoadVoteResults::decode(cmd_payload)?;
        let loaded = self
            .engine
            .load_vote_results(self.store.as_ref(), lvr.best_block)?;
        self.metrics
            .vote_results_materialized
            .inc_by(loaded.len() as u64);
        Ok(LoadVoteResultsReply {}.encode())
    }

    fn token_inventory(&self, cmd_payload: &str) -> Result<String, CacheError> {
        let ti = TokenInventory::decode(cmd_payload)?;
        let inventory = self
            .engine
            .token_inventory(self.store.as_ref(), ti.best_block)?;
        Ok(convert::token_inventory_reply(inventory).encode())
    }

    fn vote_summary(&self, cmd_payload: &str) -> Result<String, CacheError> {
        let vs = VoteSummary::decode(cmd_payload)?;
        let summary = self.engine.vote_summary(self.store.as_ref(), &vs.token)?;
        Ok(convert::vote_summary_reply(&summary).encode())
    }
}
