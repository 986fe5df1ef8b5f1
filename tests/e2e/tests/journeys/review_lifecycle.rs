//! # Review Lifecycle Journey Tests
//!
//! Walks items through the full learner workflow:
//!
//! 1. **Register** - a new item is due immediately at stage 0
//! 2. **Review** - answers move the stage and push the next review out
//! 3. **Queue** - due items come back earliest first
//! 4. **Regress** - misses cost more the longer the streak and the more mature the item
//! 5. **Unregister** - the item and its state disappear together

use chrono::Duration;
use kanji_srs_core::{Answer, ItemId, ReviewError};
use kanji_srs_e2e_tests::{TestDataFactory, TestServiceManager};

// ============================================================================
// REGISTRATION
// ============================================================================

#[test]
fn test_new_item_is_due_immediately() {
    let mut mgr = TestServiceManager::new();
    let id = mgr.register();

    let state = mgr.state(&id);
    assert_eq!(state.stage, 0);
    assert_eq!(state.incorrect_streak, 0);
    assert_eq!(state.next_review_time, mgr.now());
    assert!(mgr.is_due(&id));
    assert_eq!(mgr.service.due_items(mgr.now()).unwrap(), vec![id]);
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mgr = TestServiceManager::new();
    let id = ItemId::new();

    mgr.service.register_with_id(id, mgr.now()).unwrap();
    let err = mgr.service.register_with_id(id, mgr.now()).unwrap_err();
    assert!(matches!(err, ReviewError::Storage(_)));
}

// ============================================================================
// CLIMBING THE TABLE
// ============================================================================

#[test]
fn test_first_correct_review_waits_four_hours() {
    let mut mgr = TestServiceManager::new();
    let id = mgr.register();
    let t0 = mgr.now();

    let result = mgr.review(&id, Answer::Correct);

    assert_eq!(result.previous_stage, 0);
    assert_eq!(result.state.stage, 1);
    assert_eq!(result.state.last_review_time, t0);
    assert_eq!(result.state.next_review_time, t0 + Duration::hours(4));
    assert!(!mgr.is_due(&id));
}

#[test]
fn test_full_climb_follows_interval_table() {
    let mut mgr = TestServiceManager::new();
    let id = mgr.register();

    let expected = [
        Duration::hours(4),
        Duration::hours(8),
        Duration::days(1),
        Duration::days(2),
        Duration::days(7),
        Duration::days(14),
        Duration::days(30),
        Duration::days(120),
        // past the end of the table the last interval repeats
        Duration::days(120),
        Duration::days(120),
    ];

    let results = mgr.review_when_due(&id, &TestDataFactory::all_correct(expected.len()));

    for (i, (result, interval)) in results.iter().zip(expected).enumerate() {
        assert_eq!(result.state.stage, i as u32 + 1);
        assert_eq!(result.interval, interval, "interval after review {}", i + 1);
        assert_eq!(
            result.state.next_review_time,
            result.state.last_review_time + interval
        );
    }
}

// ============================================================================
// REGRESSION
// ============================================================================

#[test]
fn test_single_miss_on_mature_item_keeps_stage() {
    let mut mgr = TestServiceManager::new();
    let id = TestDataFactory::create_at_stage(&mut mgr, 5);

    let results = mgr.review_when_due(&id, &[Answer::Incorrect]);
    let result = &results[0];

    // streak was 0, so nothing is subtracted; the miss only starts the streak
    assert_eq!(result.state.stage, 5);
    assert_eq!(result.state.incorrect_streak, 1);
    assert_eq!(result.interval, Duration::days(7));
}

#[test]
fn test_repeated_misses_accelerate_regression() {
    let mut mgr = TestServiceManager::new();
    let id = TestDataFactory::create_at_stage(&mut mgr, 8);

    let results = mgr.review_when_due(&id, &TestDataFactory::all_incorrect(5));
    let stages: Vec<u32> = results.iter().map(|r| r.state.stage).collect();
    let streaks: Vec<u32> = results.iter().map(|r| r.state.incorrect_streak).collect();

    // mature: ceil(streak/2) * 2 for streaks 0, 1, 2; then ceil(streak/2) below stage 5
    assert_eq!(stages, vec![8, 6, 4, 2, 0]);
    assert_eq!(streaks, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_correct_answer_resets_streak() {
    let mut mgr = TestServiceManager::new();
    let item = TestDataFactory::create_with_history(&mut mgr, "yyynny");

    assert_eq!(item.state.incorrect_streak, 0);
    // 3 -> 3 (streak 0) -> 2 (streak 1) -> 3
    assert_eq!(item.state.stage, 3);
}

#[test]
fn test_struggling_item_recovers() {
    let mut mgr = TestServiceManager::new();
    let scenario = TestDataFactory::create_learning_scenario(&mut mgr);
    let struggling = scenario.item("struggling");

    let results = mgr.review_when_due(&struggling.id, &TestDataFactory::all_correct(3));
    assert_eq!(results[2].state.stage, struggling.state.stage + 3);
    assert_eq!(results[2].state.incorrect_streak, 0);
}

// ============================================================================
// QUEUE
// ============================================================================

#[test]
fn test_due_queue_is_earliest_first() {
    let mut mgr = TestServiceManager::new();
    let scenario = TestDataFactory::create_due_queue_scenario(&mut mgr);
    let soon = scenario.item("soon").id;
    let later = scenario.item("later").id;
    let tomorrow = scenario.item("tomorrow").id;
    let epoch = TestServiceManager::epoch();

    assert!(mgr.service.due_items(epoch).unwrap().is_empty());
    assert_eq!(
        mgr.service.due_items(epoch + Duration::hours(4)).unwrap(),
        vec![soon]
    );
    assert_eq!(
        mgr.service.due_items(epoch + Duration::hours(12)).unwrap(),
        vec![soon, later]
    );
    assert_eq!(
        mgr.service.due_items(epoch + Duration::days(2)).unwrap(),
        vec![soon, later, tomorrow]
    );
    assert_eq!(
        mgr.service
            .review_queue(epoch + Duration::days(2), 2)
            .unwrap(),
        vec![soon, later]
    );
}

#[test]
fn test_reviewed_item_leaves_the_queue() {
    let mut mgr = TestServiceManager::new();
    let ids = mgr.register_many(3);

    mgr.review(&ids[1], Answer::Correct);
    let due = mgr.service.due_items(mgr.now()).unwrap();

    assert_eq!(due.len(), 2);
    assert!(!due.contains(&ids[1]));
}

// ============================================================================
// PREVIEW / STATUS
// ============================================================================

#[test]
fn test_preview_does_not_record() {
    let mut mgr = TestServiceManager::new();
    let id = TestDataFactory::create_at_stage(&mut mgr, 6);
    let before = mgr.service.status(&id, mgr.now()).unwrap();

    let preview = mgr.service.preview(&id, mgr.now()).unwrap();
    assert_eq!(preview.correct.state.stage, 7);
    assert_eq!(preview.incorrect.state.stage, 6);
    assert_eq!(preview.incorrect.state.incorrect_streak, 1);

    let after = mgr.service.status(&id, mgr.now()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_status_version_advances_per_review() {
    let mut mgr = TestServiceManager::new();
    let id = mgr.register();
    let v1 = mgr.service.status(&id, mgr.now()).unwrap().version;

    mgr.review_when_due(&id, &TestDataFactory::answers("yny"));
    let v4 = mgr.service.status(&id, mgr.now()).unwrap().version;

    assert_eq!(v4.0, v1.0 + 3);
}

// ============================================================================
// UNREGISTER
// ============================================================================

#[test]
fn test_unregister_removes_state() {
    let mut mgr = TestServiceManager::new();
    let ids = mgr.register_many(2);

    assert!(mgr.service.unregister(&ids[0]).unwrap());
    assert!(!mgr.service.unregister(&ids[0]).unwrap());
    assert_eq!(mgr.item_count(), 1);

    let err = mgr
        .service
        .review_at(&ids[0], Answer::Correct, mgr.now())
        .unwrap_err();
    assert!(matches!(err, ReviewError::NotFound(id) if id == ids[0]));
    assert_eq!(mgr.service.due_items(mgr.now()).unwrap(), vec![ids[1]]);
}

#[test]
fn test_unknown_item_errors() {
    let mgr = TestServiceManager::new();
    let ghost = ItemId::new();

    assert!(matches!(
        mgr.service.status(&ghost, mgr.now()),
        Err(ReviewError::NotFound(_))
    ));
    assert!(matches!(
        mgr.service.preview(&ghost, mgr.now()),
        Err(ReviewError::NotFound(_))
    ));
}
