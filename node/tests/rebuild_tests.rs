use govcache_messages::{
    AuthorizeVote, AuthorizeVoteReply, Ballot, BallotReply, CastVote, Comment, InventoryReply,
    LikeComment, Payload, PluginCommand, StartVote, StartVoteReply, StartVoteTuple, Vote,
    VoteOption,
};
use govcache_node::{CacheConfig, CacheError, CacheNode};
use govcache_nullables::NullCacheStore;
use govcache_store::{PluginStore, VersionRecord};
use govcache_types::{
    AuthorizeAction, LikeAction, Timestamp, Token, PLUGIN_CACHE_VERSION, PLUGIN_ID,
};
use tempfile::TempDir;

fn lmdb_config(dir: &TempDir) -> CacheConfig {
    CacheConfig {
        data_dir: dir.path().join("cache"),
        map_size: 16 * 1024 * 1024,
        ..CacheConfig::default()
    }
}

fn comment(token: &str, id: &str, censored: bool) -> Comment {
    Comment {
        token: Token::new(token),
        parent_id: "0".into(),
        comment: if censored { String::new() } else { format!("body {id}") },
        signature: "sig".into(),
        public_key: "author".into(),
        comment_id: id.into(),
        receipt: format!("receipt-{id}"),
        timestamp: Timestamp::new(100),
        total_votes: 0,
        result_votes: 0,
        censored,
    }
}

fn like(token: &str, id: &str, pk: &str, action: LikeAction) -> LikeComment {
    LikeComment {
        token: Token::new(token),
        comment_id: id.into(),
        action,
        signature: "sig".into(),
        public_key: pk.into(),
    }
}

fn authorization(token: &str, receipt: &str) -> (AuthorizeVote, AuthorizeVoteReply) {
    (
        AuthorizeVote {
            action: AuthorizeAction::Authorize,
            token: Token::new(token),
            signature: "sig".into(),
            public_key: "author".into(),
            receipt: receipt.into(),
            timestamp: Timestamp::new(200),
        },
        AuthorizeVoteReply {
            action: AuthorizeAction::Authorize,
            record_version: 1,
            receipt: receipt.into(),
            timestamp: Timestamp::new(200),
        },
    )
}

fn start_vote(token: &str) -> StartVoteTuple {
    StartVoteTuple {
        start_vote: StartVote {
            public_key: "admin".into(),
            vote: Vote {
                token: Token::new(token),
                mask: 3,
                duration: 2016,
                quorum_percentage: 20,
                pass_percentage: 60,
                options: vec![
                    VoteOption {
                        id: "no".into(),
                        description: "reject".into(),
                        bits: 1,
                    },
                    VoteOption {
                        id: "yes".into(),
                        description: "approve".into(),
                        bits: 2,
                    },
                ],
            },
            signature: "sig".into(),
        },
        start_vote_reply: StartVoteReply {
            start_block_height: 10,
            start_block_hash: "hash".into(),
            end_height: 2026,
            eligible_tickets: vec!["t1".into(), "t2".into(), "t3".into()],
        },
    }
}

fn cast(token: &str, ticket: &str, bit: &str) -> CastVote {
    CastVote {
        token: Token::new(token),
        ticket: ticket.into(),
        vote_bit: bit.into(),
        signature: "sig".into(),
    }
}

fn sample_inventory() -> InventoryReply {
    let (av, avr) = authorization("aa", "auth-aa");
    InventoryReply {
        comments: vec![comment("aa", "1", false), comment("aa", "2", true)],
        like_comments: vec![
            like("aa", "1", "pk1", LikeAction::Upvote),
            like("aa", "1", "pk2", LikeAction::Downvote),
            like("aa", "1", "pk1", LikeAction::Upvote),
        ],
        authorize_votes: vec![av],
        authorize_vote_replies: vec![avr],
        start_vote_tuples: vec![start_vote("aa")],
        cast_votes: vec![cast("aa", "t1", "2"), cast("aa", "t2", "1")],
    }
}

#[test]
fn open_stamps_current_version() {
    let dir = TempDir::new().unwrap();
    let node = CacheNode::open(lmdb_config(&dir)).unwrap();
    node.rebuild.check_version().unwrap();
    let marker = node.store.version_record(PLUGIN_ID).unwrap().unwrap();
    assert_eq!(marker.version, PLUGIN_CACHE_VERSION);
}

#[test]
fn build_then_inventory_round_trips() {
    let dir = TempDir::new().unwrap();
    let node = CacheNode::open(lmdb_config(&dir)).unwrap();

    let source = sample_inventory();
    node.rebuild.build(&source).unwrap();
    node.rebuild.check_version().unwrap();

    let rebuilt = node.dispatcher.inventory().unwrap();
    assert_eq!(rebuilt.like_comments, source.like_comments);
    assert_eq!(rebuilt.authorize_votes, source.authorize_votes);
    assert_eq!(rebuilt.authorize_vote_replies, source.authorize_vote_replies);
    assert_eq!(rebuilt.start_vote_tuples, source.start_vote_tuples);
    assert_eq!(rebuilt.cast_votes, source.cast_votes);

    // pk1 upvoted twice (withdrawn), pk2 downvoted.
    let first = rebuilt.comments.iter().find(|c| c.comment_id == "1").unwrap();
    assert_eq!((first.total_votes, first.result_votes), (1, -1));
    let second = rebuilt.comments.iter().find(|c| c.comment_id == "2").unwrap();
    assert!(second.censored);

    // Building from our own inventory reproduces it.
    node.rebuild.build(&rebuilt).unwrap();
    assert_eq!(node.dispatcher.inventory().unwrap(), rebuilt);
}

#[test]
fn build_discards_previous_plugin_data() {
    let dir = TempDir::new().unwrap();
    let node = CacheNode::open(lmdb_config(&dir)).unwrap();
    node.rebuild.build(&sample_inventory()).unwrap();

    node.rebuild.build(&InventoryReply::default()).unwrap();
    assert_eq!(node.dispatcher.inventory().unwrap(), InventoryReply::default());
    node.rebuild.check_version().unwrap();
}

#[test]
fn missing_authorize_reply_fails_build_and_clears_version() {
    let dir = TempDir::new().unwrap();
    let node = CacheNode::open(lmdb_config(&dir)).unwrap();

    let mut inventory = sample_inventory();
    inventory.authorize_vote_replies.clear();
    let err = node.rebuild.build(&inventory).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(node.metrics.rebuild_failures.get(), 1);

    let err = node.rebuild.check_version().unwrap_err();
    assert!(matches!(err, CacheError::NoVersionRecord(_)));

    node.ensure_current(Some(&sample_inventory())).unwrap();
    assert_eq!(node.metrics.rebuilds.get(), 2);
}

#[test]
fn build_from_payload_rejects_garbage() {
    let node = CacheNode::with_store(CacheConfig::default(), NullCacheStore::new()).unwrap();
    let err = node.rebuild.build_from_payload("not json").unwrap_err();
    assert!(matches!(err, CacheError::Decode(_)));

    node.rebuild
        .build_from_payload(&sample_inventory().encode())
        .unwrap();
    assert_eq!(node.dispatcher.inventory().unwrap().cast_votes.len(), 2);
}

#[test]
fn stale_version_needs_inventory_to_recover() {
    let store = NullCacheStore::new();
    store
        .create_tables(&VersionRecord::new(PLUGIN_ID, "0.9", Timestamp::new(1)))
        .unwrap();
    let node = CacheNode::with_store(CacheConfig::default(), store).unwrap();

    let err = node.ensure_current(None).unwrap_err();
    assert!(matches!(err, CacheError::WrongVersion { .. }));
    assert!(err.needs_rebuild());

    node.ensure_current(Some(&InventoryReply::default())).unwrap();
    node.rebuild.check_version().unwrap();
}

#[test]
fn stale_version_without_auto_rebuild_is_reported() {
    let store = NullCacheStore::new();
    store
        .create_tables(&VersionRecord::new(PLUGIN_ID, "0.9", Timestamp::new(1)))
        .unwrap();
    let config = CacheConfig {
        auto_rebuild: false,
        ..CacheConfig::default()
    };
    let node = CacheNode::with_store(config, store).unwrap();

    let err = node
        .ensure_current(Some(&InventoryReply::default()))
        .unwrap_err();
    assert!(err.needs_rebuild());
    assert_eq!(node.metrics.rebuilds.get(), 0);
}

#[test]
fn plugin_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let node = CacheNode::open(lmdb_config(&dir)).unwrap();
        node.rebuild.build(&sample_inventory()).unwrap();
        node.dispatcher
            .exec(
                PluginCommand::Ballot,
                &Ballot {
                    votes: vec![cast("aa", "t3", "2")],
                }
                .encode(),
                &BallotReply { receipts: vec![] }.encode(),
            )
            .unwrap();
    }

    let node = CacheNode::open(lmdb_config(&dir)).unwrap();
    node.ensure_current(None).unwrap();
    assert_eq!(node.dispatcher.inventory().unwrap().cast_votes.len(), 3);
}
