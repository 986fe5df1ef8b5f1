//! Review session simulation
//!
//! Replays a sequence of answers against a single item, reviewing it the
//! moment it becomes due each time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kanji_srs_core::{Answer, InMemoryStore, ReviewError, ReviewService, ServiceConfig, SrsPolicy};

/// One simulated review
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStep {
    /// 1-based review number
    pub review: usize,
    /// When the review happened
    pub reviewed_at: DateTime<Utc>,
    /// Answer given
    pub answer: Answer,
    /// Stage before the review
    pub from_stage: u32,
    /// Stage after the review
    pub to_stage: u32,
    /// Incorrect streak after the review
    pub incorrect_streak: u32,
    /// Delay until the next review, in milliseconds
    pub interval_ms: i64,
    /// When the item is next due
    pub next_review_time: DateTime<Utc>,
}

/// Parse "yynyn" or "correct,incorrect,..." into answers
pub fn parse_answers(raw: &str) -> Result<Vec<Answer>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("answer sequence is empty".to_string());
    }

    if raw.contains(',') {
        raw.split(',')
            .map(|s| s.trim().parse::<Answer>())
            .collect()
    } else {
        raw.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_string().parse::<Answer>())
            .collect()
    }
}

/// Register one item at `start` and apply each answer when the item is due
pub fn simulate(
    policy: SrsPolicy,
    answers: &[Answer],
    start: DateTime<Utc>,
) -> Result<Vec<SimulationStep>, ReviewError> {
    let service =
        ReviewService::from_policy(InMemoryStore::new(), policy, ServiceConfig::from_env())?;
    let id = service.register(start)?;

    let mut steps = Vec::with_capacity(answers.len());
    for (index, answer) in answers.iter().enumerate() {
        let now = service.status(&id, start)?.state.next_review_time;
        let result = service.review_at(&id, *answer, now)?;

        steps.push(SimulationStep {
            review: index + 1,
            reviewed_at: now,
            answer: *answer,
            from_stage: result.previous_stage,
            to_stage: result.state.stage,
            incorrect_streak: result.state.incorrect_streak,
            interval_ms: result.interval.num_milliseconds(),
            next_review_time: result.state.next_review_time,
        });
    }

    Ok(steps)
}
