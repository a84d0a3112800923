//! End-to-end flows through the dispatcher
//!
//! Each test drives a real `Dispatcher` over `MockGateway` and checks the
//! state the reducer produced, read back through the selectors.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use libpostboard::gateway::mock::{GatewayCall, MockGateway};
use libpostboard::service::Outcome;
use libpostboard::types::{PostDraft, PostEdits, PostRef, UserRef};
use libpostboard::{Config, LoadStatus, OperationError, ReactionKind};
use postboard_app::Dispatcher;
use tempfile::NamedTempFile;

fn dispatcher(gateway: MockGateway) -> Dispatcher {
    Dispatcher::new(Arc::new(gateway)).unwrap()
}

fn seeded(ids: &[i64]) -> MockGateway {
    MockGateway::with_posts(
        ids.iter()
            .map(|&id| MockGateway::raw_post(id, 1, &format!("post {}", id)))
            .collect(),
    )
}

fn not_found() -> OperationError {
    OperationError::Http {
        status: 404,
        reason: "Not Found".to_string(),
    }
}

#[test]
fn test_fetch_two_posts() {
    let mut dispatcher = dispatcher(seeded(&[1, 2]));

    assert_eq!(dispatcher.status(), LoadStatus::Idle);
    assert_eq!(dispatcher.fetch_posts(), Outcome::Applied);

    let posts = dispatcher.all_posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, 1);
    assert!(posts[0].date > posts[1].date);
    assert!(posts.iter().all(|p| p.reactions.total() == 0));
    assert_eq!(dispatcher.status(), LoadStatus::Succeeded);
    assert_eq!(dispatcher.error(), None);
}

#[test]
fn test_pending_is_visible_before_settling() {
    let mut dispatcher =
        dispatcher(seeded(&[1]).with_delay(Duration::from_millis(100)));

    let handle = dispatcher.spawn_fetch_posts();
    assert_eq!(dispatcher.status(), LoadStatus::Loading);

    dispatcher.wait(handle);
    assert_eq!(dispatcher.status(), LoadStatus::Succeeded);
}

#[test]
fn test_failed_fetch_then_refetch_clears_error() {
    let mut dispatcher = dispatcher(
        MockGateway::new().failing_list(OperationError::Network("connection refused".to_string())),
    );

    let outcome = dispatcher.fetch_posts();
    assert!(matches!(outcome, Outcome::Rejected(_)));
    assert_eq!(dispatcher.status(), LoadStatus::Failed);
    assert_eq!(dispatcher.error(), Some("Network error: connection refused"));

    // Only pending is applied here; the refetch fails again once it settles
    let handle = dispatcher.spawn_fetch_posts();
    assert_eq!(dispatcher.status(), LoadStatus::Loading);
    assert_eq!(dispatcher.error(), None);
    dispatcher.wait(handle);
    assert_eq!(dispatcher.status(), LoadStatus::Failed);
}

#[test]
fn test_create_coerces_text_user_id() {
    let mut dispatcher = dispatcher(seeded(&[1]));
    dispatcher.fetch_posts();

    let outcome = dispatcher.add_new_post(PostDraft {
        title: "A".to_string(),
        body: "B".to_string(),
        user_id: UserRef::Text("3".to_string()),
    });
    assert_eq!(outcome, Outcome::Applied);

    let post = dispatcher.post(101).unwrap();
    assert_eq!(post.user_id, Some(3));
    assert_eq!(post.reactions.total(), 0);
    assert_eq!(dispatcher.post_ids(), &[101, 1]);
}

#[test]
fn test_create_failure_leaves_store_alone() {
    let mut dispatcher = dispatcher(
        seeded(&[1]).failing_create(OperationError::Network("timeout".to_string())),
    );
    dispatcher.fetch_posts();
    let before = dispatcher.state().clone();

    let outcome = dispatcher.add_new_post(PostDraft {
        title: "A".to_string(),
        body: "B".to_string(),
        user_id: UserRef::Number(1),
    });

    assert!(matches!(outcome, Outcome::Rejected(OperationError::Network(_))));
    assert_eq!(dispatcher.state(), &before);
}

#[test]
fn test_delete_not_found_keeps_post() {
    let mut dispatcher = dispatcher(seeded(&[7]).failing_delete(not_found()));
    dispatcher.fetch_posts();

    let outcome = dispatcher.delete_post(PostRef { id: 7 });

    assert_eq!(outcome, Outcome::Rejected(not_found()));
    assert!(dispatcher.post(7).is_some());
}

#[test]
fn test_delete_removes_post() {
    let mut dispatcher = dispatcher(seeded(&[1, 7]));
    dispatcher.fetch_posts();

    assert_eq!(dispatcher.delete_post(PostRef { id: 7 }), Outcome::Applied);
    assert!(dispatcher.post(7).is_none());
    assert_eq!(dispatcher.post_ids(), &[1]);
}

#[test]
fn test_update_failure_applies_edits_optimistically() {
    let mut dispatcher = dispatcher(
        seeded(&[1, 9]).failing_update(OperationError::Network("connection reset".to_string())),
    );
    dispatcher.fetch_posts();
    let newest_before = dispatcher.post(1).unwrap().date;

    let outcome = dispatcher.update_post(PostEdits::new(9).title("X"));

    assert!(matches!(outcome, Outcome::AppliedOptimistically(_)));
    let post = dispatcher.post(9).unwrap();
    assert_eq!(post.title, "X");
    assert_eq!(post.body, "body of post 9");
    assert!(post.date > newest_before);
    assert_eq!(dispatcher.post_ids()[0], 9);
}

#[test]
fn test_invalid_update_never_calls_gateway() {
    let gateway = seeded(&[1]);
    let calls = gateway.call_log();
    let mut dispatcher = dispatcher(gateway);
    dispatcher.fetch_posts();
    let before = dispatcher.state().clone();

    let outcome = dispatcher.update_post(PostEdits::new(-1).title("X"));

    assert!(matches!(outcome, Outcome::Rejected(OperationError::Malformed(_))));
    assert_eq!(*calls.lock().unwrap(), vec![GatewayCall::List]);
    assert_eq!(dispatcher.state(), &before);
}

#[test]
fn test_failed_update_of_unknown_post_lands_in_store() {
    let mut dispatcher = dispatcher(
        seeded(&[1]).failing_update(OperationError::Network("down".to_string())),
    );
    dispatcher.fetch_posts();

    let outcome = dispatcher.update_post(PostEdits::new(9).title("X"));

    assert!(matches!(outcome, Outcome::AppliedOptimistically(_)));
    let post = dispatcher.post(9).unwrap();
    assert_eq!(post.title, "X");
    assert_eq!(post.user_id, None);
    assert_eq!(dispatcher.post_ids(), &[9, 1]);
}

#[test]
fn test_confirmed_update_of_unknown_post_lands_in_store() {
    let mut dispatcher = dispatcher(seeded(&[1]));
    dispatcher.fetch_posts();

    let outcome = dispatcher.update_post(PostEdits::new(9).title("X").user_id(2));

    assert_eq!(outcome, Outcome::Applied);
    let post = dispatcher.post(9).unwrap();
    assert_eq!(post.title, "X");
    assert_eq!(post.user_id, Some(2));
    assert_eq!(dispatcher.posts_by_user(2).len(), 1);
}

#[test]
fn test_update_with_non_numeric_author_is_rejected() {
    let gateway = seeded(&[1]);
    let calls = gateway.call_log();
    let mut dispatcher = dispatcher(gateway);
    dispatcher.fetch_posts();
    let before = dispatcher.state().clone();

    let mut edits = PostEdits::new(1);
    edits.user_id = Some(UserRef::Text("someone".to_string()));
    let outcome = dispatcher.update_post(edits);

    assert!(matches!(outcome, Outcome::Rejected(OperationError::Malformed(_))));
    assert_eq!(*calls.lock().unwrap(), vec![GatewayCall::List]);
    assert_eq!(dispatcher.state(), &before);
}

#[test]
fn test_reactions_through_dispatcher() {
    let mut dispatcher = dispatcher(seeded(&[5]));
    dispatcher.fetch_posts();

    dispatcher.react(5, "wow");
    dispatcher.react(5, "wow");
    dispatcher.react(5, "applause");
    dispatcher.react(404, "wow");

    let reactions = dispatcher.post(5).unwrap().reactions;
    assert_eq!(reactions.get(ReactionKind::Wow), 2);
    assert_eq!(reactions.total(), 2);
}

#[test]
fn test_later_fast_update_lands_before_earlier_slow_one() {
    let gateway = seeded(&[1]).with_scripted_delays(vec![
        Duration::from_millis(0),
        Duration::from_millis(300),
        Duration::from_millis(0),
    ]);
    let mut dispatcher = dispatcher(gateway);
    dispatcher.fetch_posts();

    // Delays are assigned when a call starts; let the slow one start first
    let slow = dispatcher.spawn_update_post(PostEdits::new(1).title("slow"));
    std::thread::sleep(Duration::from_millis(50));
    let fast = dispatcher.spawn_update_post(PostEdits::new(1).title("fast"));

    dispatcher.wait(fast);
    assert_eq!(dispatcher.post(1).unwrap().title, "fast");

    // Last delivered wins
    dispatcher.wait(slow);
    assert_eq!(dispatcher.post(1).unwrap().title, "slow");
}

#[test]
fn test_dropped_handle_still_mutates_state() {
    let mut dispatcher =
        dispatcher(seeded(&[1]).with_scripted_delays(vec![
            Duration::from_millis(0),
            Duration::from_millis(50),
        ]));
    dispatcher.fetch_posts();

    drop(dispatcher.spawn_update_post(PostEdits::new(1).title("stale")));
    assert_eq!(dispatcher.post(1).unwrap().title, "post 1");

    assert!(dispatcher.wait_for_event(Duration::from_secs(5)));
    assert_eq!(dispatcher.post(1).unwrap().title, "stale");
}

#[test]
fn test_posts_by_user_memoized_across_unrelated_actions() {
    let mut dispatcher = dispatcher(MockGateway::with_posts(vec![
        MockGateway::raw_post(1, 1, "a"),
        MockGateway::raw_post(2, 2, "b"),
        MockGateway::raw_post(3, 1, "c"),
    ]));
    dispatcher.fetch_posts();

    let first = dispatcher.posts_by_user(1);
    dispatcher.react(999, "heart");
    let second = dispatcher.posts_by_user(1);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(dispatcher.posts_by_user_recomputations(), 1);
    let ids: Vec<i64> = first.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);

    dispatcher.react(3, "heart");
    let third = dispatcher.posts_by_user(1);
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(dispatcher.posts_by_user_recomputations(), 2);
}

#[test]
fn test_from_config_with_unreachable_api() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[api]\nbase_url = \"http://127.0.0.1:9/posts\"\ntimeout_secs = 2").unwrap();
    let config = Config::load_from_path(file.path()).unwrap();

    let mut dispatcher = Dispatcher::from_config(&config).unwrap();
    let outcome = dispatcher.fetch_posts();

    assert!(matches!(outcome, Outcome::Rejected(OperationError::Network(_))));
    assert_eq!(dispatcher.status(), LoadStatus::Failed);
    assert!(dispatcher.error().is_some());
}
