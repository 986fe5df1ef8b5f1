//! In-process review store
//!
//! Reference [`ReviewStore`] backed by a map plus a `(next_review_time, id)`
//! index, so due queries walk only the due prefix. State lives as long as
//! the store value; nothing is written to disk.

use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::store::{
    ItemId, Result, ReviewStore, SetOutcome, StorageError, Version, VersionedState,
};
use crate::srs::ReviewState;

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<ItemId, VersionedState>,
    due_index: BTreeSet<(DateTime<Utc>, ItemId)>,
}

/// Thread-safe in-memory store
///
/// All methods take `&self`, so the store can be shared as `Arc<InMemoryStore>`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| StorageError::LockPoisoned("store read lock"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| StorageError::LockPoisoned("store write lock"))
    }

    /// Number of registered items
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.items.len())
    }

    /// Whether no items are registered
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.items.is_empty())
    }
}

impl ReviewStore for InMemoryStore {
    fn insert(&self, id: ItemId, state: ReviewState) -> Result<Version> {
        let mut inner = self.write()?;
        if inner.items.contains_key(&id) {
            return Err(StorageError::AlreadyExists(id));
        }

        inner.due_index.insert((state.next_review_time, id));
        inner.items.insert(
            id,
            VersionedState {
                state,
                version: Version::INITIAL,
            },
        );
        Ok(Version::INITIAL)
    }

    fn get(&self, id: &ItemId) -> Result<Option<VersionedState>> {
        Ok(self.read()?.items.get(id).copied())
    }

    fn conditional_set(
        &self,
        id: &ItemId,
        expected: Version,
        new_state: ReviewState,
    ) -> Result<SetOutcome> {
        let mut guard = self.write()?;
        let inner = &mut *guard;

        let entry = inner
            .items
            .get_mut(id)
            .ok_or(StorageError::NotFound(*id))?;

        if entry.version != expected {
            return Ok(SetOutcome::Conflict {
                current: entry.version,
            });
        }

        inner
            .due_index
            .remove(&(entry.state.next_review_time, *id));
        inner.due_index.insert((new_state.next_review_time, *id));

        entry.state = new_state;
        entry.version = entry.version.next();
        Ok(SetOutcome::Applied(entry.version))
    }

    fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<ItemId>> {
        self.list_due_limited(now, usize::MAX)
    }

    fn list_due_limited(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ItemId>> {
        let inner = self.read()?;
        Ok(inner
            .due_index
            .iter()
            .take_while(|(due_at, _)| *due_at <= now)
            .take(limit)
            .map(|(_, id)| *id)
            .collect())
    }

    fn remove(&self, id: &ItemId) -> Result<bool> {
        let mut inner = self.write()?;
        match inner.items.remove(id) {
            Some(entry) => {
                inner
                    .due_index
                    .remove(&(entry.state.next_review_time, *id));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
