//! Phase 1 tests: posts, vote ledger, scoring, users.

use std::sync::{Arc, Mutex};

use rankboard::types::error::BoardError;
use rankboard::types::{
    EventContext, PostBuilder, PostEvent, User, UserId, Vote, VotePolicy, MAX_USER_FIELD_LEN,
};
use serde_json::json;

// ==================== Helper ====================

fn context(start: i64, rate: f64) -> Arc<EventContext> {
    Arc::new(EventContext::new(start, rate))
}

fn uid(s: &str) -> Option<UserId> {
    Some(UserId::from(s))
}

// ==================== Vote Ledger Tests ====================

#[test]
fn test_duplicate_voter_rejected() {
    let ctx = context(0, 0.0);
    let post = PostBuilder::new("question").context(&ctx).build();

    assert!(post.add_vote(uid("a"), Some(10), false));
    assert!(!post.add_vote(uid("a"), Some(20), false));
    assert_eq!(post.vote_count(), 1);
    assert_eq!(post.votes()[0].timestamp, 10);
}

#[test]
fn test_distinct_voters_each_add_one() {
    let ctx = context(0, 0.0);
    let post = PostBuilder::new("question").context(&ctx).build();

    for i in 0..20u64 {
        let before = post.vote_count();
        assert!(post.add_vote(Some(UserId::from(i)), Some(i as i64), false));
        assert_eq!(post.vote_count(), before + 1);
    }
}

#[test]
fn test_anonymous_votes_unbounded_by_default() {
    let ctx = context(0, 0.0);
    let post = PostBuilder::new("q").context(&ctx).build();

    assert!(post.add_vote(None, Some(1), false));
    assert!(post.add_vote(None, Some(2), false));
    assert!(post.add_vote(None, Some(3), false));
    assert_eq!(post.vote_count(), 3);
    assert!(post.has_vote_from(None));
}

#[test]
fn test_anonymous_dedup_when_policy_forbids() {
    let ctx = Arc::new(EventContext::new(0, 0.0).with_vote_policy(VotePolicy {
        allow_anonymous_multi_vote: false,
    }));
    let post = PostBuilder::new("q").context(&ctx).build();

    assert!(post.add_vote(None, Some(1), false));
    assert!(!post.add_vote(None, Some(2), false));
    assert!(post.add_vote(uid("a"), Some(3), false));
    assert_eq!(post.vote_count(), 2);
}

#[test]
fn test_vote_timestamp_defaults_to_now() {
    let post = PostBuilder::new("q").build();
    let before = rankboard::now_millis();
    assert!(post.add_vote(uid("a"), None, false));
    let after = rankboard::now_millis();

    let ts = post.votes()[0].timestamp;
    assert!(ts >= before && ts <= after);
}

#[test]
fn test_vote_notification() {
    let post = PostBuilder::new("q").build();
    let seen: Arc<Mutex<Vec<PostEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    post.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

    post.add_vote(uid("a"), Some(5), false);
    post.add_vote(uid("a"), Some(6), false); // duplicate: no event
    post.add_vote(uid("b"), Some(7), true); // silent: no event

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], PostEvent::Vote(Vote::new(uid("a"), 5)));
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let post = PostBuilder::new("q").build();
    let count = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&count);
    let id = post.subscribe(move |_| *sink.lock().unwrap() += 1);

    post.add_vote(uid("a"), Some(1), false);
    assert!(post.unsubscribe(id));
    post.add_vote(uid("b"), Some(2), false);

    assert_eq!(*count.lock().unwrap(), 1);
    assert!(!post.unsubscribe(id));
}

#[test]
fn test_has_vote_from() {
    let post = PostBuilder::new("q").build();
    post.add_vote(uid("a"), Some(1), false);

    assert!(post.has_vote_from(Some(&UserId::from("a"))));
    assert!(!post.has_vote_from(Some(&UserId::from("b"))));
    assert!(!post.has_vote_from(None));
}

// ==================== Recent / Most Recent ====================

#[test]
fn test_recent_votes_window() {
    let post = PostBuilder::new("q").build();
    let now = 1_000_000;
    post.add_vote(uid("a"), Some(now - 10), false);
    post.add_vote(uid("b"), Some(now - 60_000), false);
    post.add_vote(uid("c"), Some(now - 200_000), false);

    assert_eq!(post.recent_votes_at(120_000, now), 2);
    assert_eq!(post.recent_votes_at(60_000, now), 1);
    assert_eq!(post.recent_votes_at(60_001, now), 2);
    assert_eq!(post.recent_votes_at(10, now), 0);
    assert_eq!(post.recent_votes_at(u64::MAX, now), 3);
}

#[test]
fn test_recent_votes_monotonic_in_window() {
    let post = PostBuilder::new("q").build();
    let now = 500_000;
    for i in 0..50u64 {
        post.add_vote(Some(UserId::from(i)), Some(now - (i as i64) * 7_919), false);
    }

    let mut previous = usize::MAX;
    for window in (0..=400_000u64).rev().step_by(1_000) {
        let count = post.recent_votes_at(window, now);
        assert!(count <= previous);
        previous = count;
    }
}

#[test]
fn test_recent_votes_default_window() {
    let post = PostBuilder::new("q").build();
    let now = rankboard::now_millis();
    post.add_vote(uid("a"), Some(now - 1_000), false);
    post.add_vote(uid("b"), Some(now - 10 * 60_000), false);

    assert_eq!(post.recent_votes(None), 1);
    assert_eq!(post.recent_votes(Some(3_600_000)), 2);
}

#[test]
fn test_most_recent_vote() {
    let post = PostBuilder::new("q").build();
    assert!(post.most_recent_vote().is_none());

    post.add_vote(uid("a"), Some(300), false);
    post.add_vote(uid("b"), Some(900), false);
    post.add_vote(uid("c"), Some(100), false);

    let latest = post.most_recent_vote().unwrap();
    assert_eq!(latest.timestamp, 900);
    assert_eq!(latest.voter, uid("b"));
}

// ==================== Score Tests ====================

#[test]
fn test_score_scenario_zero_decay() {
    let ctx = context(1000, 0.0);
    let post = PostBuilder::new("q").context(&ctx).build();
    assert_eq!(post.score(), 0.0);

    assert!(post.add_vote(uid("a"), Some(2000), false));
    assert_eq!(post.score(), 1.0);

    assert!(!post.add_vote(uid("a"), Some(3000), false));
    assert_eq!(post.score(), 1.0);

    assert!(post.add_vote(uid("b"), Some(3000), false));
    assert_eq!(post.score(), 2.0);
}

#[test]
fn test_score_with_decay() {
    let ctx = context(1_000, 0.001);
    let post = PostBuilder::new("q").context(&ctx).build();
    post.add_vote(uid("a"), Some(2_000), false); // 1 + 1.0
    post.add_vote(uid("b"), Some(3_000), false); // 1 + 2.0

    assert!((post.score() - 5.0).abs() < 1e-9);
}

#[test]
fn test_later_votes_weigh_more() {
    let ctx = context(0, 0.000_001);
    let early = PostBuilder::new("early").context(&ctx).build();
    let late = PostBuilder::new("late").context(&ctx).build();
    early.add_vote(uid("a"), Some(1_000), false);
    late.add_vote(uid("a"), Some(600_000), false);

    assert!(late.score() > early.score());
}

#[test]
fn test_score_without_context() {
    let post = PostBuilder::new("orphan").build();
    post.add_vote(uid("a"), Some(10), false);

    assert_eq!(post.score(), 0.0);
    assert!(matches!(post.try_score(), Err(BoardError::MissingEventContext)));
}

#[test]
fn test_score_after_context_dropped() {
    let ctx = context(0, 0.0);
    let post = PostBuilder::new("q").context(&ctx).build();
    post.add_vote(uid("a"), Some(10), false);
    assert_eq!(post.score(), 1.0);

    drop(ctx);
    assert!(post.context().is_none());
    assert_eq!(post.score(), 0.0);
}

#[test]
fn test_score_function_is_pure() {
    let ctx = EventContext::new(100, 0.5);
    let votes = vec![Vote::new(None, 100), Vote::new(uid("x"), 104)];
    let a = rankboard::score_votes(&votes, &ctx);
    let b = rankboard::score_votes(&votes, &ctx);
    assert_eq!(a, b);
    assert!((a - 4.0).abs() < 1e-12);
    assert_eq!(rankboard::score_votes(&[], &ctx), 0.0);
}

#[test]
fn test_score_extreme_timestamps() {
    let ctx = context(1_000, 0.000_001);
    let early = PostBuilder::new("early").context(&ctx).build();
    assert!(early.add_vote(uid("a"), Some(i64::MIN), false));
    let score = early.score();
    assert!(score.is_finite());
    assert!(score < 0.0);

    let late = PostBuilder::new("late").context(&ctx).build();
    assert!(late.add_vote(uid("a"), Some(i64::MAX), false));
    assert!(late.score().is_finite());
    assert!(late.score() > score);

    let flat = context(i64::MAX, 0.0);
    let votes = vec![Vote::new(None, i64::MIN)];
    assert_eq!(rankboard::score_votes(&votes, &flat), 1.0);
}

// ==================== Promotion ====================

#[test]
fn test_promote() {
    let post = PostBuilder::new("q").build();
    assert!(!post.is_promoted());
    assert_eq!(post.promoted_at(), None);

    post.promote(Some(500));
    assert!(post.is_promoted());
    assert_eq!(post.promoted_at(), Some(500));

    post.promote(Some(800));
    assert_eq!(post.promoted_at(), Some(800));
}

#[test]
fn test_promote_emits_attribute_change() {
    let post = PostBuilder::new("q").build();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    post.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

    post.promote(None);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![PostEvent::AttributeChanged("promoted_at")]
    );
}

// ==================== Named Attributes ====================

#[test]
fn test_post_defaults() {
    let post = PostBuilder::default().build();
    assert_eq!(post.text(), "default text");
    assert_eq!(post.author_name(), "default name");
    assert_eq!(post.author_affiliation(), "nowhere");
    assert_eq!(post.author_id(), None);
    assert_eq!(post.vote_count(), 0);
}

#[test]
fn test_attribute_get() {
    let post = PostBuilder::new("hello")
        .author("Ada", "Analytical", uid("u1"))
        .created_at(42)
        .build();
    post.add_vote(uid("v"), Some(50), false);

    assert_eq!(post.attribute("text"), Some(json!("hello")));
    assert_eq!(post.attribute("author_name"), Some(json!("Ada")));
    assert_eq!(post.attribute("author_id"), Some(json!("u1")));
    assert_eq!(post.attribute("created_at"), Some(json!(42)));
    assert_eq!(post.attribute("promoted_at"), Some(json!(null)));
    assert_eq!(
        post.attribute("votes"),
        Some(json!([{"id": "v", "timestamp": 50}]))
    );
    assert_eq!(post.attribute("nonsense"), None);
}

#[test]
fn test_attribute_set() {
    let post = PostBuilder::new("hello").build();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    post.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

    post.set_attribute("text", json!("edited")).unwrap();
    post.set_attribute("promoted_at", json!(99)).unwrap();

    assert_eq!(post.text(), "edited");
    assert_eq!(post.promoted_at(), Some(99));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            PostEvent::AttributeChanged("text"),
            PostEvent::AttributeChanged("promoted_at"),
        ]
    );
}

#[test]
fn test_attribute_set_rejections() {
    let post = PostBuilder::new("hello").build();

    assert!(matches!(
        post.set_attribute("votes", json!([])),
        Err(BoardError::ReadOnlyAttribute(_))
    ));
    assert!(matches!(
        post.set_attribute("bogus", json!(1)),
        Err(BoardError::UnknownAttribute(_))
    ));
    assert!(matches!(
        post.set_attribute("text", json!(5)),
        Err(BoardError::InvalidAttribute { .. })
    ));

    post.promote(Some(1));
    assert!(matches!(
        post.set_attribute("promoted_at", json!(null)),
        Err(BoardError::InvalidAttribute { .. })
    ));
    assert!(post.is_promoted());
}

// ==================== User Validation ====================

#[test]
fn test_user_validation() {
    let ok = User::new("1", "Grace", "Navy");
    assert!(ok.validate().is_ok());

    let exact = User::new("2", "x".repeat(MAX_USER_FIELD_LEN), "y".repeat(MAX_USER_FIELD_LEN));
    assert!(exact.validate().is_ok());

    let long_name = User::new("3", "n".repeat(31), "ok");
    let err = long_name.validate().unwrap_err();
    assert!(err.to_string().contains("too long a name"));

    let long_aff = User::new("4", "ok", "a".repeat(31));
    let err = long_aff.validate().unwrap_err();
    assert!(err.to_string().contains("too long an affiliation"));
}

#[test]
fn test_user_not_validated_on_construction() {
    let user = User::new(7u64, "z".repeat(100), "fine");
    assert_eq!(user.name.len(), 100);
    assert_eq!(user.id().as_str(), "7");
}

#[test]
fn test_user_defaults() {
    let user = User::anonymous("u");
    assert_eq!(user.name, "default name");
    assert_eq!(user.affiliation, "default affiliation");
}

#[test]
fn test_vote_with_user_id() {
    let ctx = context(0, 0.0);
    let post = PostBuilder::new("q").context(&ctx).build();
    let user = User::new("u9", "Linus", "Kernel");

    assert!(post.add_vote(Some(user.id().clone()), Some(1), false));
    assert!(post.has_vote_from(Some(user.id())));
}
