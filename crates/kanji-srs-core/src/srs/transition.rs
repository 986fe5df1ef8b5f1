//! Stage Transition
//!
//! Computes the next stage from the current stage, the incorrect streak
//! *before* this review, and the answer.
//!
//! - Correct: stage + 1, no ceiling.
//! - Incorrect: drop by `ceil(streak / 2) * penalty`, where `penalty` is the
//!   policy's mature penalty once the stage has reached the mature threshold
//!   and 1 below it. The result is floored at 0.
//!
//! A first miss (streak 0) therefore leaves the stage unchanged; repeated
//! misses regress harder, and mature items regress twice as fast.

use serde::{Deserialize, Serialize};

/// Stage at which an item counts as mature
pub const DEFAULT_MATURE_STAGE: u32 = 5;

/// Regression multiplier applied to mature items
pub const DEFAULT_MATURE_PENALTY: u32 = 2;

/// Outcome of a single review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    /// The learner recalled the item
    Correct,
    /// The learner failed to recall the item
    Incorrect,
}

impl Answer {
    /// Build from the boolean "correct" flag used by callers
    pub fn from_bool(correct: bool) -> Self {
        if correct {
            Answer::Correct
        } else {
            Answer::Incorrect
        }
    }

    /// Whether this answer was correct
    #[inline]
    pub fn is_correct(&self) -> bool {
        matches!(self, Answer::Correct)
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Correct => "correct",
            Answer::Incorrect => "incorrect",
        }
    }
}

impl From<bool> for Answer {
    fn from(correct: bool) -> Self {
        Answer::from_bool(correct)
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "correct" | "c" | "y" | "yes" | "true" | "1" => Ok(Answer::Correct),
            "incorrect" | "i" | "n" | "no" | "false" | "0" => Ok(Answer::Incorrect),
            _ => Err(format!("Unknown answer: {}", s)),
        }
    }
}

/// Regression applied on a miss: `ceil(streak / 2) * penalty_factor`
#[inline]
pub fn regression(stage: u32, incorrect_streak: u32, mature_stage: u32, mature_penalty: u32) -> u32 {
    let adjustment_count = incorrect_streak.div_ceil(2);
    let penalty_factor = if stage >= mature_stage {
        mature_penalty
    } else {
        1
    };
    adjustment_count.saturating_mul(penalty_factor)
}

/// Next stage under the given mature threshold and penalty.
///
/// `incorrect_streak` must be the value before this review is counted.
pub fn next_stage_with(
    stage: u32,
    incorrect_streak: u32,
    answer: Answer,
    mature_stage: u32,
    mature_penalty: u32,
) -> u32 {
    match answer {
        Answer::Correct => stage.saturating_add(1),
        Answer::Incorrect => {
            stage.saturating_sub(regression(stage, incorrect_streak, mature_stage, mature_penalty))
        }
    }
}

/// Next stage under the canonical threshold (5) and penalty (2)
#[inline]
pub fn next_stage(stage: u32, incorrect_streak: u32, answer: Answer) -> u32 {
    next_stage_with(
        stage,
        incorrect_streak,
        answer,
        DEFAULT_MATURE_STAGE,
        DEFAULT_MATURE_PENALTY,
    )
}

/// Streak after this review: reset on a correct answer, otherwise +1
#[inline]
pub fn next_streak(incorrect_streak: u32, answer: Answer) -> u32 {
    match answer {
        Answer::Correct => 0,
        Answer::Incorrect => incorrect_streak.saturating_add(1),
    }
}
