//! # Kanji SRS Core
//!
//! Spaced repetition scheduling engine for learnable items (kanji, vocabulary,
//! any flashcard-like unit). Decides how an item's review stage evolves and
//! when it is next due, given whether the learner answered correctly.
//!
//! - **Interval table**: nine stages from "immediately" to 120 days, saturating
//!   past the last stage
//! - **Streak-weighted regression**: repeated misses drop the stage by
//!   `ceil(streak / 2)`, doubled once an item is mature (stage 5+)
//! - **Stateless scheduler**: pure `ReviewState -> ReviewState` transitions,
//!   safe to share across threads
//! - **Conditional writes**: the review service retries on version conflicts
//!   so concurrent reviews of one item never lose an update
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use kanji_srs_core::{Answer, ReviewScheduler, ReviewState};
//!
//! let scheduler = ReviewScheduler::canonical();
//! let now = Utc::now();
//!
//! let state = ReviewState::new(now);
//! let next = scheduler.apply_review(&state, Answer::Correct, now);
//!
//! assert_eq!(next.stage, 1);
//! assert_eq!(next.next_review_time, now + Duration::hours(4));
//! assert!(!next.is_due(now));
//! ```
//!
//! With a store:
//!
//! ```rust
//! use chrono::Utc;
//! use kanji_srs_core::{Answer, InMemoryStore, ReviewService};
//!
//! let service = ReviewService::new(InMemoryStore::new());
//! let now = Utc::now();
//!
//! let id = service.register(now)?;
//! service.review_at(&id, Answer::Incorrect, now)?;
//! assert!(service.status(&id, now)?.due);
//! # Ok::<(), kanji_srs_core::ReviewError>(())
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod service;
pub mod srs;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Scheduling engine
pub use srs::{
    format_interval,
    next_stage,
    next_stage_with,
    next_streak,
    Answer,
    IntervalTable,
    ReviewPreview,
    ReviewResult,
    ReviewScheduler,
    ReviewState,
    SrsError,
    SrsPolicy,
    CANONICAL_INTERVALS_MS,
    DEFAULT_MATURE_PENALTY,
    DEFAULT_MATURE_STAGE,
};

// Storage collaborator
pub use storage::{
    InMemoryStore, ItemId, ReviewStore, SetOutcome, StorageError, Version, VersionedState,
};

// Orchestration
pub use service::{ItemStatus, ReviewError, ReviewService, ServiceConfig};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Answer, InMemoryStore, ItemId, ReviewError, ReviewScheduler, ReviewService, ReviewState,
        ReviewStore, SrsPolicy,
    };
}
