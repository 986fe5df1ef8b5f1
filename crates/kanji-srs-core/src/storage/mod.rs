//! Storage Module
//!
//! Review-state store contract with:
//! - Per-item versioning for conditional (compare-and-swap) writes
//! - Due-item listing ordered by next review time
//! - An in-process reference implementation

mod memory;
mod store;

pub use memory::InMemoryStore;
pub use store::{
    ItemId, Result, ReviewStore, SetOutcome, StorageError, Version, VersionedState,
};
