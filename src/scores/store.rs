//! The in-memory store holding the current snapshot of the scores.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::trace;
use parking_lot::RwLock;

use super::parser::ScoreMap;
use crate::models::Metadata;

/// A consistent view of the dataset, as published by one refresh.
/// A snapshot is never modified once committed.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// The scores indexed by CVE identifier
    pub scores: ScoreMap,
    /// The metadata of the dataset, None until the first refresh
    pub metadata: Option<Metadata>,
    /// When the snapshot was committed, None until the first refresh
    pub last_updated: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Creates a snapshot from a freshly parsed dataset.
    pub fn new(scores: ScoreMap, metadata: Metadata, last_updated: DateTime<Utc>) -> Self {
        Snapshot {
            scores,
            metadata: Some(metadata),
            last_updated: Some(last_updated),
        }
    }
}

/// Holds the current [`Snapshot`].
///
/// Readers share the lock and leave with an `Arc` to the snapshot, so they
/// keep a consistent view even if a commit happens right after. A commit
/// only holds the write lock for the time of swapping the pointer.
#[derive(Debug, Default)]
pub struct CacheStore {
    snapshot: RwLock<Arc<Snapshot>>,
}

impl CacheStore {
    /// Creates a store holding an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot.
    pub fn read(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Replaces the current snapshot.
    pub fn commit(&self, snapshot: Snapshot) {
        trace!("Running CacheStore::commit()");
        let snapshot = Arc::new(snapshot);
        *self.snapshot.write() = snapshot;
    }
}
