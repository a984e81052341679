//! Conversions between wire payloads and stored rows.

use govcache_governance::{LikeTally, TokenInventory, VoteSummary};
use govcache_messages::{
    AuthorizeVote, AuthorizeVoteReply, CastVote, Comment, LikeComment, NewComment,
    NewCommentReply, StartVote, StartVoteReply, StartVoteTuple, Vote, VoteOption,
    VoteOptionResult, VoteSummaryReply, TokenInventoryReply,
};
use govcache_messages::records as wire;
use govcache_store::{
    AuthorizeVoteRow, CastVoteRow, CommentLikeRow, CommentRow, StartVoteRow, VoteOptionResultRow,
    VoteOptionRow,
};

/// Row for a freshly created comment. Id, receipt and timestamp come from
/// the authoritative store's reply.
pub fn new_comment_row(nc: &NewComment, reply: &NewCommentReply) -> CommentRow {
    CommentRow {
        token: nc.token.clone(),
        comment_id: reply.comment_id.clone(),
        parent_id: nc.parent_id.clone(),
        comment: nc.comment.clone(),
        signature: nc.signature.clone(),
        public_key: nc.public_key.clone(),
        receipt: reply.receipt.clone(),
        timestamp: reply.timestamp,
        censored: false,
    }
}

/// Row for an inventory comment, censored flag included.
pub fn comment_row(c: &Comment) -> CommentRow {
    CommentRow {
        token: c.token.clone(),
        comment_id: c.comment_id.clone(),
        parent_id: c.parent_id.clone(),
        comment: c.comment.clone(),
        signature: c.signature.clone(),
        public_key: c.public_key.clone(),
        receipt: c.receipt.clone(),
        timestamp: c.timestamp,
        censored: c.censored,
    }
}

pub fn comment(row: &CommentRow, tally: LikeTally) -> Comment {
    Comment {
        token: row.token.clone(),
        parent_id: row.parent_id.clone(),
        comment: row.comment.clone(),
        signature: row.signature.clone(),
        public_key: row.public_key.clone(),
        comment_id: row.comment_id.clone(),
        receipt: row.receipt.clone(),
        timestamp: row.timestamp,
        total_votes: tally.total,
        result_votes: tally.result,
        censored: row.censored,
    }
}

pub fn like_row(lc: &LikeComment) -> CommentLikeRow {
    CommentLikeRow {
        token: lc.token.clone(),
        comment_id: lc.comment_id.clone(),
        action: lc.action,
        signature: lc.signature.clone(),
        public_key: lc.public_key.clone(),
    }
}

pub fn like(row: &CommentLikeRow) -> LikeComment {
    LikeComment {
        token: row.token.clone(),
        comment_id: row.comment_id.clone(),
        action: row.action,
        signature: row.signature.clone(),
        public_key: row.public_key.clone(),
    }
}

/// Row for an authorization. The record version, receipt and timestamp
/// come from the reply.
pub fn authorize_vote_row(av: &AuthorizeVote, reply: &AuthorizeVoteReply) -> AuthorizeVoteRow {
    AuthorizeVoteRow {
        token: av.token.clone(),
        version: reply.record_version,
        action: av.action,
        signature: av.signature.clone(),
        public_key: av.public_key.clone(),
        receipt: reply.receipt.clone(),
        timestamp: reply.timestamp,
    }
}

pub fn authorize_vote(row: &AuthorizeVoteRow) -> (AuthorizeVote, AuthorizeVoteReply) {
    (
        AuthorizeVote {
            action: row.action,
            token: row.token.clone(),
            signature: row.signature.clone(),
            public_key: row.public_key.clone(),
            receipt: row.receipt.clone(),
            timestamp: row.timestamp,
        },
        AuthorizeVoteReply {
            action: row.action,
            record_version: row.version,
            receipt: row.receipt.clone(),
            timestamp: row.timestamp,
        },
    )
}

fn option_row(o: &VoteOption) -> VoteOptionRow {
    VoteOptionRow {
        id: o.id.clone(),
        description: o.description.clone(),
        bits: o.bits,
    }
}

fn option(o: &VoteOptionRow) -> VoteOption {
    VoteOption {
        id: o.id.clone(),
        description: o.description.clone(),
        bits: o.bits,
    }
}

pub fn start_vote_row(sv: &StartVote, reply: &StartVoteReply) -> StartVoteRow {
    StartVoteRow {
        token: sv.vote.token.clone(),
        public_key: sv.public_key.clone(),
        signature: sv.signature.clone(),
        mask: sv.vote.mask,
        duration: sv.vote.duration,
        quorum_percentage: sv.vote.quorum_percentage,
        pass_percentage: sv.vote.pass_percentage,
        options: sv.vote.options.iter().map(option_row).collect(),
        start_block_height: reply.start_block_height,
        start_block_hash: reply.start_block_hash.clone(),
        end_height: reply.end_height,
        eligible_ticket_count: reply.eligible_tickets.len() as u64,
        eligible_tickets: reply.eligible_tickets.clone(),
    }
}

pub fn start_vote(row: &StartVoteRow) -> StartVoteTuple {
    StartVoteTuple {
        start_vote: StartVote {
            public_key: row.public_key.clone(),
            vote: Vote {
                token: row.token.clone(),
                mask: row.mask,
                duration: row.duration,
                quorum_percentage: row.quorum_percentage,
                pass_percentage: row.pass_percentage,
                options: row.options.iter().map(option).collect(),
            },
            signature: row.signature.clone(),
        },
        start_vote_reply: StartVoteReply {
            start_block_height: row.start_block_height,
            start_block_hash: row.start_block_hash.clone(),
            end_height: row.end_height,
            eligible_tickets: row.eligible_tickets.clone(),
        },
    }
}

pub fn cast_vote_row(cv: &CastVote) -> CastVoteRow {
    CastVoteRow {
        token: cv.token.clone(),
        ticket: cv.ticket.clone(),
        vote_bit: cv.vote_bit.clone(),
        signature: cv.signature.clone(),
    }
}

pub fn cast_vote(row: &CastVoteRow) -> CastVote {
    CastVote {
        token: row.token.clone(),
        ticket: row.ticket.clone(),
        vote_bit: row.vote_bit.clone(),
        signature: row.signature.clone(),
    }
}

fn option_result(r: &VoteOptionResultRow) -> VoteOptionResult {
    VoteOptionResult {
        id: r.option.id.clone(),
        description: r.option.description.clone(),
        bits: r.option.bits,
        votes: r.votes,
    }
}

pub fn vote_summary_reply(summary: &VoteSummary) -> VoteSummaryReply {
    VoteSummaryReply {
        authorized: summary.authorized,
        end_height: summary.end_height,
        eligible_ticket_count: summary.eligible_ticket_count,
        quorum_percentage: summary.quorum_percentage,
        pass_percentage: summary.pass_percentage,
        results: summary.results.iter().map(option_result).collect(),
    }
}

pub fn token_inventory_reply(inventory: TokenInventory) -> TokenInventoryReply {
    TokenInventoryReply {
        pre: inventory.pre,
        active: inventory.active,
        approved: inventory.approved,
        rejected: inventory.rejected,
        abandoned: inventory.abandoned,
    }
}

pub fn metadata_streams(streams: &[wire::MetadataStream]) -> Vec<govcache_store::MetadataStream> {
    streams
        .iter()
        .map(|m| govcache_store::MetadataStream {
            id: m.id,
            payload: m.payload.clone(),
        })
        .collect()
}

pub fn record(r: &wire::Record) -> govcache_store::Record {
    govcache_store::Record {
        token: r.token.clone(),
        version: r.version,
        status: r.status,
        timestamp: r.timestamp,
        merkle: r.merkle.clone(),
        signature: r.signature.clone(),
        metadata: metadata_streams(&r.metadata),
        files: r
            .files
            .iter()
            .map(|f| govcache_store::File {
                name: f.name.clone(),
                mime: f.mime.clone(),
                digest: f.digest.clone(),
                payload: f.payload.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govcache_types::{AuthorizeAction, Timestamp, Token};

    #[test]
    fn start_vote_counts_eligible_tickets() {
        let sv = StartVote {
            public_key: "pk".into(),
            vote: Vote {
                token: Token::new("aa"),
                mask: 3,
                duration: 2016,
                quorum_percentage: 20,
                pass_percentage: 60,
                options: vec![VoteOption {
                    id: "yes".into(),
                    description: "Approve".into(),
                    bits: 2,
                }],
            },
            signature: "sig".into(),
        };
        let reply = StartVoteReply {
            start_block_height: 100,
            start_block_hash: "hash".into(),
            end_height: 2116,
            eligible_tickets: vec!["t1".into(), "t2".into(), "t3".into()],
        };
        let row = start_vote_row(&sv, &reply);
        assert_eq!(row.eligible_ticket_count, 3);
        assert_eq!(row.options[0].vote_bit(), "2");

        let tuple = start_vote(&row);
        assert_eq!(tuple.start_vote, sv);
        assert_eq!(tuple.start_vote_reply, reply);
    }

    #[test]
    fn authorize_vote_takes_version_from_reply() {
        let av = AuthorizeVote {
            action: AuthorizeAction::Authorize,
            token: Token::new("aa"),
            signature: "sig".into(),
            public_key: "pk".into(),
            receipt: String::new(),
            timestamp: Timestamp::EPOCH,
        };
        let reply = AuthorizeVoteReply {
            action: AuthorizeAction::Authorize,
            record_version: 3,
            receipt: "receipt".into(),
            timestamp: Timestamp::new(42),
        };
        let row = authorize_vote_row(&av, &reply);
        assert_eq!(row.version, 3);
        assert_eq!(row.receipt, "receipt");
        assert_eq!(row.timestamp, Timestamp::new(42));

        let (back, back_reply) = authorize_vote(&row);
        assert_eq!(back.receipt, "receipt");
        assert_eq!(back_reply, reply);
    }
}
