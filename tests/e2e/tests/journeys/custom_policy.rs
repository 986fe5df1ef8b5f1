//! # Custom Policy Journey Tests
//!
//! Loads scheduling policies from JSON files the way a deployment would and
//! checks the service honours them end to end.

use chrono::Duration;
use kanji_srs_core::{Answer, ReviewScheduler, SrsError, SrsPolicy, CANONICAL_INTERVALS_MS};
use kanji_srs_e2e_tests::{TestDataFactory, TestServiceManager};

const HOUR_MS: i64 = 3_600_000;

#[test]
fn test_empty_policy_file_is_canonical() {
    let mgr = TestServiceManager::with_policy_json("{}");
    assert_eq!(mgr.service.scheduler().policy(), &SrsPolicy::canonical());
}

#[test]
fn test_short_table_saturates_early() {
    let json = format!(
        r#"{{"intervals": [0, {}, {}, {}]}}"#,
        HOUR_MS,
        2 * HOUR_MS,
        24 * HOUR_MS
    );
    let mut mgr = TestServiceManager::with_policy_json(&json);
    let id = mgr.register();

    let results = mgr.review_when_due(&id, &TestDataFactory::all_correct(5));
    let intervals: Vec<Duration> = results.iter().map(|r| r.interval).collect();

    assert_eq!(
        intervals,
        vec![
            Duration::hours(1),
            Duration::hours(2),
            Duration::days(1),
            Duration::days(1),
            Duration::days(1),
        ]
    );
    assert_eq!(results[4].state.stage, 5);
}

#[test]
fn test_mature_threshold_and_penalty_are_configurable() {
    let mut mgr = TestServiceManager::with_policy_json(r#"{"matureStage": 3, "maturePenalty": 3}"#);
    let id = TestDataFactory::create_at_stage(&mut mgr, 9);

    let results = mgr.review_when_due(&id, &TestDataFactory::all_incorrect(3));
    let stages: Vec<u32> = results.iter().map(|r| r.state.stage).collect();

    // streak 0 -> 0, streak 1 -> 1*3, streak 2 -> 1*3
    assert_eq!(stages, vec![9, 6, 3]);
}

#[test]
fn test_canonical_policy_round_trips_through_file() {
    let json = serde_json::to_string_pretty(&SrsPolicy::canonical()).unwrap();
    let mgr = TestServiceManager::with_policy_json(&json);

    let written = std::fs::read_to_string(mgr.policy_path().unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    let intervals: Vec<i64> = serde_json::from_value(value["intervals"].clone()).unwrap();

    assert_eq!(intervals, CANONICAL_INTERVALS_MS.to_vec());
    assert_eq!(value["matureStage"], 5);
    assert_eq!(value["maturePenalty"], 2);
}

#[test]
fn test_invalid_policies_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let cases = [
        ("empty_table.json", r#"{"intervals": []}"#),
        ("negative.json", r#"{"intervals": [0, -1]}"#),
        ("decreasing.json", r#"{"intervals": [0, 10, 5]}"#),
        ("zero_penalty.json", r#"{"maturePenalty": 0}"#),
        ("unknown_field.json", r#"{"intervalz": [0]}"#),
        ("not_json.json", "stage = 1"),
    ];

    for (name, body) in cases {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        let result = SrsPolicy::resolve(Some(path.as_path())).and_then(ReviewScheduler::new);
        assert!(result.is_err(), "{} should be rejected", name);
    }
}

#[test]
fn test_missing_policy_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SrsPolicy::from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SrsError::Io(_)));
}

#[test]
fn test_custom_policy_preview() {
    let mgr = TestServiceManager::with_policy_json(r#"{"intervals": [0, 60000]}"#);
    let id = mgr.service.register(mgr.now()).unwrap();

    let preview = mgr.service.preview(&id, mgr.now()).unwrap();
    assert_eq!(preview.correct.interval, Duration::minutes(1));
    assert_eq!(preview.incorrect.interval, Duration::zero());
    assert_eq!(preview.incorrect.answer, Answer::Incorrect);
}
