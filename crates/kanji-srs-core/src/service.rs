//! Review Service
//!
//! Drives a [`ReviewStore`] with the scheduler. Each review is a read,
//! a pure transition, and a conditional write against the version that
//! was read. A conflicting write means another review landed first: the
//! state is re-read and the review is recomputed, up to
//! [`ServiceConfig::max_review_attempts`] times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::srs::{
    Answer, ReviewPreview, ReviewResult, ReviewScheduler, ReviewState, SrsError, SrsPolicy,
};
use crate::storage::{ItemId, ReviewStore, SetOutcome, StorageError, Version};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Environment variable overriding the review attempt limit
pub const MAX_ATTEMPTS_ENV_VAR: &str = "KANJI_SRS_MAX_REVIEW_ATTEMPTS";

/// Default number of read/compute/write attempts per review
pub const DEFAULT_MAX_REVIEW_ATTEMPTS: u32 = 5;

/// Service configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Attempts before a contended review gives up (>= 1)
    pub max_review_attempts: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_review_attempts: DEFAULT_MAX_REVIEW_ATTEMPTS,
        }
    }
}

impl ServiceConfig {
    /// Defaults, overridden by `KANJI_SRS_MAX_REVIEW_ATTEMPTS` when set
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(MAX_ATTEMPTS_ENV_VAR).ok().as_deref())
    }

    /// Config from a raw attempt-limit value. Missing or unparseable values
    /// give the default; zero is raised to one.
    pub fn from_env_value(raw: Option<&str>) -> Self {
        let max_review_attempts = raw
            .and_then(|s| s.trim().parse::<u32>().ok())
            .map(|n| n.max(1))
            .unwrap_or(DEFAULT_MAX_REVIEW_ATTEMPTS);
        Self {
            max_review_attempts,
        }
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Review service error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Underlying store failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// Scheduler input or policy rejected
    #[error("Scheduler error: {0}")]
    Srs(#[from] SrsError),
    /// No review state registered for this item
    #[error("Item not found: {0}")]
    NotFound(ItemId),
    /// Every attempt lost a write race
    #[error("Review of {id} kept conflicting; gave up after {attempts} attempts")]
    ConflictRetriesExhausted {
        /// Contended item
        id: ItemId,
        /// Attempts made
        attempts: u32,
    },
}

impl ReviewError {
    /// Whether retrying the whole operation later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReviewError::ConflictRetriesExhausted { .. })
    }
}

/// Review service result type
pub type Result<T> = std::result::Result<T, ReviewError>;

// ============================================================================
// STATUS
// ============================================================================

/// Snapshot of one item's schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatus {
    /// Item identifier
    pub id: ItemId,
    /// Stored review state
    pub state: ReviewState,
    /// Stored version
    pub version: Version,
    /// Whether the item is due at the queried time
    pub due: bool,
}

// ============================================================================
// SERVICE
// ============================================================================

/// Orchestrates reviews against a store
#[derive(Debug)]
pub struct ReviewService<S> {
    store: S,
    scheduler: ReviewScheduler,
    config: ServiceConfig,
}

impl<S: ReviewStore> ReviewService<S> {
    /// Service with the canonical scheduler and default config
    pub fn new(store: S) -> Self {
        Self::with_scheduler(store, ReviewScheduler::canonical(), ServiceConfig::default())
    }

    /// Service whose scheduler is built from `policy`; an invalid policy
    /// fails with [`ReviewError::Srs`]
    pub fn from_policy(store: S, policy: SrsPolicy, config: ServiceConfig) -> Result<Self> {
        let scheduler = ReviewScheduler::new(policy)?;
        Ok(Self::with_scheduler(store, scheduler, config))
    }

    /// Service with an explicit scheduler and config
    pub fn with_scheduler(store: S, scheduler: ReviewScheduler, config: ServiceConfig) -> Self {
        let config = ServiceConfig {
            max_review_attempts: config.max_review_attempts.max(1),
        };
        Self {
            store,
            scheduler,
            config,
        }
    }

    /// The backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The scheduler in use
    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    /// Active configuration
    pub fn config(&self) -> ServiceConfig {
        self.config
    }

    /// Register a new item with a fresh state created at `now`
    pub fn register(&self, now: DateTime<Utc>) -> Result<ItemId> {
        let id = ItemId::new();
        self.register_with_id(id, now)?;
        Ok(id)
    }

    /// Register a caller-identified item
    pub fn register_with_id(&self, id: ItemId, now: DateTime<Utc>) -> Result<ReviewState> {
        let state = ReviewState::new(now);
        self.store.insert(id, state)?;
        info!(item = %id, "Registered item for review");
        Ok(state)
    }

    /// Review an item at the current wall-clock time
    pub fn review(&self, id: &ItemId, answer: Answer) -> Result<ReviewResult> {
        self.review_at(id, answer, Utc::now())
    }

    /// Review an item at `now`, retrying on write conflicts
    pub fn review_at(&self, id: &ItemId, answer: Answer, now: DateTime<Utc>) -> Result<ReviewResult> {
        let max_attempts = self.config.max_review_attempts;

        for attempt in 1..=max_attempts {
            let current = self
                .store
                .get(id)?
                .ok_or(ReviewError::NotFound(*id))?;

            let result = self.scheduler.review(&current.state, answer, now);

            match self.store.conditional_set(id, current.version, result.state) {
                Ok(SetOutcome::Applied(version)) => {
                    debug!(
                        item = %id,
                        %answer,
                        from_stage = result.previous_stage,
                        to_stage = result.state.stage,
                        streak = result.state.incorrect_streak,
                        next_review = %result.state.next_review_time,
                        %version,
                        attempt,
                        "Review applied"
                    );
                    return Ok(result);
                }
                Ok(SetOutcome::Conflict { current: stored }) => {
                    warn!(
                        item = %id,
                        expected = %current.version,
                        found = %stored,
                        attempt,
                        max_attempts,
                        "Review write conflicted, re-reading state"
                    );
                }
                Err(StorageError::NotFound(_)) => return Err(ReviewError::NotFound(*id)),
                Err(e) => return Err(e.into()),
            }
        }

        Err(ReviewError::ConflictRetriesExhausted {
            id: *id,
            attempts: max_attempts,
        })
    }

    /// Both possible outcomes for an item without recording either
    pub fn preview(&self, id: &ItemId, now: DateTime<Utc>) -> Result<ReviewPreview> {
        let current = self.store.get(id)?.ok_or(ReviewError::NotFound(*id))?;
        Ok(self.scheduler.preview(&current.state, now))
    }

    /// Current schedule and dueness of an item
    pub fn status(&self, id: &ItemId, now: DateTime<Utc>) -> Result<ItemStatus> {
        let current = self.store.get(id)?.ok_or(ReviewError::NotFound(*id))?;
        Ok(ItemStatus {
            id: *id,
            state: current.state,
            version: current.version,
            due: self.scheduler.is_due(&current.state, now),
        })
    }

    /// All items due at `now`, earliest first
    pub fn due_items(&self, now: DateTime<Utc>) -> Result<Vec<ItemId>> {
        Ok(self.store.list_due(now)?)
    }

    /// At most `limit` due items, earliest first
    pub fn review_queue(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ItemId>> {
        Ok(self.store.list_due_limited(now, limit)?)
    }

    /// Remove an item's state along with the item
    pub fn unregister(&self, id: &ItemId) -> Result<bool> {
        let removed = self.store.remove(id)?;
        if removed {
            info!(item = %id, "Unregistered item");
        }
        Ok(removed)
    }
}

// ============================================================================
// TESTS
// ============================================================================
