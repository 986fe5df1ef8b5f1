//! Review Scheduler
//!
//! Applies one review event to a [`ReviewState`]. The scheduler owns no
//! storage and no mutable state; every call is a pure transition from one
//! state to the next, so a single value can be shared freely across threads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::{Result, SrsError};
use super::interval::IntervalTable;
use super::policy::SrsPolicy;
use super::transition::{next_stage_with, next_streak, Answer};

// ============================================================================
// REVIEW STATE
// ============================================================================

/// Per-item scheduling state.
///
/// Invariant after any review: `next_review_time == last_review_time +
/// interval(stage)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewState {
    /// Current SRS level
    pub stage: u32,
    /// Consecutive incorrect reviews since the last correct one
    pub incorrect_streak: u32,
    /// When the most recent review completed
    pub last_review_time: DateTime<Utc>,
    /// When the item becomes eligible for review again
    pub next_review_time: DateTime<Utc>,
}

impl ReviewState {
    /// Fresh state for a newly registered item: stage 0, due immediately
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            stage: 0,
            incorrect_streak: 0,
            last_review_time: created_at,
            next_review_time: created_at,
        }
    }

    /// Build a state from unchecked signed input, rejecting negatives
    pub fn from_raw(
        stage: i64,
        incorrect_streak: i64,
        last_review_time: DateTime<Utc>,
        next_review_time: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            stage: non_negative("stage", stage)?,
            incorrect_streak: non_negative("incorrect_streak", incorrect_streak)?,
            last_review_time,
            next_review_time,
        })
    }

    /// Due once `now` has reached `next_review_time`
    #[inline]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_time <= now
    }

    /// Time left until due (zero when already due)
    pub fn time_until_due(&self, now: DateTime<Utc>) -> Duration {
        (self.next_review_time - now).max(Duration::zero())
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(SrsError::InvalidPrecondition { field, value });
    }
    u32::try_from(value).map_err(|_| SrsError::OutOfRange { field, value })
}

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of one review with the details callers usually report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    /// The new state
    pub state: ReviewState,
    /// Stage before the review
    pub previous_stage: u32,
    /// Delay applied to reach `next_review_time`
    #[serde(with = "duration_millis")]
    pub interval: Duration,
    /// The answer that was applied
    pub answer: Answer,
}

impl ReviewResult {
    /// Signed stage movement (+1 on correct, <= 0 on a miss)
    pub fn stage_delta(&self) -> i64 {
        i64::from(self.state.stage) - i64::from(self.previous_stage)
    }
}

/// Both possible outcomes of reviewing a state now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPreview {
    /// Outcome if answered correctly
    pub correct: ReviewResult,
    /// Outcome if answered incorrectly
    pub incorrect: ReviewResult,
}

mod duration_millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = i64::deserialize(d)?;
        Duration::try_milliseconds(ms)
            .ok_or_else(|| serde::de::Error::custom(format!("duration {} ms out of range", ms)))
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Stateless review scheduler parameterised by an [`SrsPolicy`]
#[derive(Debug, Clone, Default)]
pub struct ReviewScheduler {
    policy: SrsPolicy,
}

impl ReviewScheduler {
    /// Scheduler with a validated custom policy
    pub fn new(policy: SrsPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Scheduler with the canonical policy
    pub fn canonical() -> Self {
        Self {
            policy: SrsPolicy::canonical(),
        }
    }

    /// Active policy
    pub fn policy(&self) -> &SrsPolicy {
        &self.policy
    }

    /// Active interval table
    pub fn intervals(&self) -> &IntervalTable {
        &self.policy.intervals
    }

    /// Delay for a stage (saturating)
    #[inline]
    pub fn interval_for(&self, stage: u32) -> Duration {
        self.policy.intervals.interval(stage)
    }

    /// Next stage for a state and answer
    #[inline]
    pub fn next_stage(&self, stage: u32, incorrect_streak: u32, answer: Answer) -> u32 {
        next_stage_with(
            stage,
            incorrect_streak,
            answer,
            self.policy.mature_stage,
            self.policy.mature_penalty,
        )
    }

    /// Apply a review and report the details
    pub fn review(&self, state: &ReviewState, answer: Answer, now: DateTime<Utc>) -> ReviewResult {
        // Stage uses the streak as it was before this answer
        let stage = self.next_stage(state.stage, state.incorrect_streak, answer);
        let incorrect_streak = next_streak(state.incorrect_streak, answer);
        let interval = self.interval_for(stage);
        let next_review_time = now
            .checked_add_signed(interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        ReviewResult {
            state: ReviewState {
                stage,
                incorrect_streak,
                last_review_time: now,
                next_review_time,
            },
            previous_stage: state.stage,
            interval,
            answer,
        }
    }

    /// Apply a review, returning only the new state
    #[inline]
    pub fn apply_review(
        &self,
        state: &ReviewState,
        answer: impl Into<Answer>,
        now: DateTime<Utc>,
    ) -> ReviewState {
        self.review(state, answer.into(), now).state
    }

    /// Outcomes for both answers without committing either
    pub fn preview(&self, state: &ReviewState, now: DateTime<Utc>) -> ReviewPreview {
        ReviewPreview {
            correct: self.review(state, Answer::Correct, now),
            incorrect: self.review(state, Answer::Incorrect, now),
        }
    }

    /// Whether the state is due at `now`
    #[inline]
    pub fn is_due(&self, state: &ReviewState, now: DateTime<Utc>) -> bool {
        state.is_due(now)
    }
}

// ============================================================================
// TESTS
// ============================================================================
