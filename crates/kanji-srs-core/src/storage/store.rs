//! Review-state store contract
//!
//! The scheduler never touches storage. Services drive a [`ReviewStore`]
//! with a read / compute / conditional-write cycle so concurrent reviews of
//! the same item cannot silently overwrite each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::srs::ReviewState;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Item not found
    #[error("Item not found: {0}")]
    NotFound(ItemId),
    /// Item already registered
    #[error("Item already exists: {0}")]
    AlreadyExists(ItemId),
    /// A lock guarding the store was poisoned by a panicking writer
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// IDENTIFIERS & VERSIONS
// ============================================================================

/// Identifier of a learnable item (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Monotonic per-item write counter used for compare-and-swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    /// Version assigned on insert
    pub const INITIAL: Version = Version(1);

    /// The version after one more write
    pub fn next(self) -> Self {
        Version(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A review state together with the version it was read at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedState {
    /// Stored state
    pub state: ReviewState,
    /// Version of that state
    pub version: Version,
}

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Write applied; the item is now at this version
    Applied(Version),
    /// Someone else wrote first; the item is at `current`
    Conflict {
        /// Version currently stored
        current: Version,
    },
}

impl SetOutcome {
    /// Whether the write went through
    pub fn is_applied(&self) -> bool {
        matches!(self, SetOutcome::Applied(_))
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Durable keyed review state, one entry per learnable item
pub trait ReviewStore: Send + Sync {
    /// Register a new item. Fails with `AlreadyExists` on duplicates.
    fn insert(&self, id: ItemId, state: ReviewState) -> Result<Version>;

    /// Current state and version, or `None` if unknown
    fn get(&self, id: &ItemId) -> Result<Option<VersionedState>>;

    /// Replace the state only if the stored version still equals `expected`.
    /// Fails with `NotFound` if the item is gone.
    fn conditional_set(
        &self,
        id: &ItemId,
        expected: Version,
        new_state: ReviewState,
    ) -> Result<SetOutcome>;

    /// Items with `next_review_time <= now`, earliest first
    fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<ItemId>>;

    /// The first `limit` items of [`ReviewStore::list_due`], without
    /// collecting the rest
    fn list_due_limited(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ItemId>>;

    /// Drop an item's state. Returns whether it existed.
    fn remove(&self, id: &ItemId) -> Result<bool>;
}

impl<T: ReviewStore + ?Sized> ReviewStore for std::sync::Arc<T> {
    fn insert(&self, id: ItemId, state: ReviewState) -> Result<Version> {
        (**self).insert(id, state)
    }

    fn get(&self, id: &ItemId) -> Result<Option<VersionedState>> {
        (**self).get(id)
    }

    fn conditional_set(
        &self,
        id: &ItemId,
        expected: Version,
        new_state: ReviewState,
    ) -> Result<SetOutcome> {
        (**self).conditional_set(id, expected, new_state)
    }

    fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<ItemId>> {
        (**self).list_due(now)
    }

    fn list_due_limited(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ItemId>> {
        (**self).list_due_limited(now, limit)
    }

    fn remove(&self, id: &ItemId) -> Result<bool> {
        (**self).remove(id)
    }
}
