//! SRS (Spaced Repetition System) Module
//!
//! Stage-based scheduling with a fixed interval table and streak-weighted
//! regression.
//!
//! ## Core rules:
//! - Interval: `table[min(stage, K)]`, saturating at the last entry
//! - Correct answer: `stage + 1`, streak reset to 0
//! - Incorrect answer: `stage - ceil(streak / 2) * penalty` floored at 0,
//!   where `penalty = 2` from stage 5 upward and `1` below; streak + 1
//! - Due: `next_review_time <= now`

mod error;
mod interval;
mod policy;
mod scheduler;
mod transition;

pub use error::{Result, SrsError};

pub use interval::{format_interval, IntervalTable, CANONICAL_INTERVALS_MS};

pub use policy::{SrsPolicy, POLICY_ENV_VAR};

pub use scheduler::{ReviewPreview, ReviewResult, ReviewScheduler, ReviewState};

pub use transition::{
    next_stage,
    next_stage_with,
    next_streak,
    regression,
    Answer,
    // Constants
    DEFAULT_MATURE_PENALTY,
    DEFAULT_MATURE_STAGE,
};
