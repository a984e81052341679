//! decode(encode(x)) == x for representative payloads, including empty
//! collections and zero-length strings.

use proptest::prelude::*;

use govcache_messages::*;
use govcache_types::{Timestamp, Token};

fn token() -> impl Strategy<Value = Token> {
    "[0-9a-f]{0,64}".prop_map(Token::new)
}

fn text() -> impl Strategy<Value = String> {
    ".{0,24}"
}

fn comment() -> impl Strategy<Value = Comment> {
    (
        token(),
        text(),
        text(),
        text(),
        any::<i64>(),
        any::<u64>(),
        any::<i64>(),
        any::<bool>(),
    )
        .prop_map(
            |(token, id, body, key, ts, total_votes, result_votes, censored)| Comment {
                token,
                parent_id: id.clone(),
                comment: body,
                signature: key.clone(),
                public_key: key,
                comment_id: id,
                receipt: String::new(),
                timestamp: Timestamp::new(ts),
                total_votes,
                result_votes,
                censored,
            },
        )
}

fn like_action() -> impl Strategy<Value = LikeAction> {
    prop_oneof![
        Just(LikeAction::Upvote),
        Just(LikeAction::Neutral),
        Just(LikeAction::Downvote),
    ]
}

fn like() -> impl Strategy<Value = LikeComment> {
    (token(), text(), like_action(), text()).prop_map(|(token, comment_id, action, key)| {
        LikeComment {
            token,
            comment_id,
            action,
            signature: key.clone(),
            public_key: key,
        }
    })
}

fn cast_vote() -> impl Strategy<Value = CastVote> {
    (token(), "[0-9a-f]{0,64}", "[0-9a-f]{1,2}", text()).prop_map(
        |(token, ticket, vote_bit, signature)| CastVote {
            token,
            ticket,
            vote_bit,
            signature,
        },
    )
}

fn start_vote_tuple() -> impl Strategy<Value = StartVoteTuple> {
    (
        token(),
        prop::collection::vec((text(), text(), any::<u64>()), 0..4),
        any::<u32>(),
        0u32..=100,
        0u32..=100,
        any::<u64>(),
        prop::collection::vec("[0-9a-f]{8}", 0..8),
    )
        .prop_map(|(token, opts, duration, quorum, pass, end_height, tickets)| {
            let options = opts
                .into_iter()
                .map(|(id, description, bits)| VoteOption {
                    id,
                    description,
                    bits,
                })
                .collect();
            StartVoteTuple {
                start_vote: StartVote {
                    public_key: String::new(),
                    vote: Vote {
                        token,
                        mask: 3,
                        duration,
                        quorum_percentage: quorum,
                        pass_percentage: pass,
                        options,
                    },
                    signature: String::new(),
                },
                start_vote_reply: StartVoteReply {
                    start_block_height: 0,
                    start_block_hash: String::new(),
                    end_height,
                    eligible_tickets: tickets,
                },
            }
        })
}

fn assert_round_trip<T: Payload + PartialEq + std::fmt::Debug>(value: &T) {
    let decoded = T::decode(&value.encode()).expect("encoded payload must decode");
    assert_eq!(&decoded, value);
}

proptest! {
    #[test]
    fn get_comments_reply_round_trip(comments in prop::collection::vec(comment(), 0..5)) {
        assert_round_trip(&GetCommentsReply { comments });
    }

    #[test]
    fn comment_likes_reply_round_trip(likes in prop::collection::vec(like(), 0..5)) {
        assert_round_trip(&CommentLikesReply { comment_likes: likes });
    }

    #[test]
    fn ballot_round_trip(votes in prop::collection::vec(cast_vote(), 0..6)) {
        assert_round_trip(&Ballot { votes });
    }

    #[test]
    fn start_vote_round_trip(tuple in start_vote_tuple()) {
        assert_round_trip(&tuple.start_vote);
        assert_round_trip(&tuple.start_vote_reply);
    }

    #[test]
    fn inventory_reply_round_trip(
        comments in prop::collection::vec(comment(), 0..3),
        likes in prop::collection::vec(like(), 0..3),
        tuples in prop::collection::vec(start_vote_tuple(), 0..2),
        votes in prop::collection::vec(cast_vote(), 0..3),
    ) {
        assert_round_trip(&InventoryReply {
            comments,
            like_comments: likes,
            authorize_votes: Vec::new(),
            authorize_vote_replies: Vec::new(),
            start_vote_tuples: tuples,
            cast_votes: votes,
        });
    }

    #[test]
    fn token_inventory_reply_round_trip(
        pre in prop::collection::vec(token(), 0..4),
        active in prop::collection::vec(token(), 0..4),
        approved in prop::collection::vec(token(), 0..4),
    ) {
        assert_round_trip(&TokenInventoryReply {
            pre,
            active,
            approved,
            rejected: Vec::new(),
            abandoned: Vec::new(),
        });
    }

    #[test]
    fn vote_summary_reply_round_trip(
        authorized in any::<bool>(),
        end_height in prop::option::of(any::<u64>()),
        eligible in any::<u64>(),
    ) {
        assert_round_trip(&VoteSummaryReply {
            authorized,
            end_height,
            eligible_ticket_count: eligible,
            quorum_percentage: 20,
            pass_percentage: 60,
            results: vec![VoteOptionResult {
                id: "yes".into(),
                description: String::new(),
                bits: 2,
                votes: eligible / 2,
            }],
        });
    }
}

#[test]
fn vote_details_reply_with_nothing_recorded() {
    assert_round_trip(&VoteDetailsReply {
        authorize_vote: None,
        start_vote: None,
        start_vote_reply: None,
    });
}

#[test]
fn authorize_vote_and_reply_round_trip() {
    assert_round_trip(&AuthorizeVote {
        action: AuthorizeAction::Revoke,
        token: Token::new("abc"),
        signature: String::new(),
        public_key: String::new(),
        receipt: "r".into(),
        timestamp: Timestamp::new(1_550_000_000),
    });
    assert_round_trip(&AuthorizeVoteReply {
        action: AuthorizeAction::Authorize,
        record_version: 3,
        receipt: "r".into(),
        timestamp: Timestamp::new(1_550_000_000),
    });
}

#[test]
fn empty_command_payloads_round_trip() {
    assert_round_trip(&Inventory {});
    assert_round_trip(&LoadVoteResultsReply {});
    assert_round_trip(&InventoryReply::default());
}
