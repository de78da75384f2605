//! In-memory feed store
//!
//! Holds the envelope slot in a mutex-guarded `Option`. Satisfies the
//! same contract as the file store and is used both as an ephemeral
//! store and as the in-process double for use-case tests. Completions
//! run inline on the calling thread, which the contract allows.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use photofeed_model::{CacheEnvelope, CachedFeed, FeedRecord};

use super::{FeedStore, RetrievalCompletion, WriteCompletion};

/// Feed store keeping the envelope slot in process memory.
#[derive(Debug, Default)]
pub struct InMemoryFeedStore {
    slot: Mutex<Option<CacheEnvelope>>,
}

impl InMemoryFeedStore {
    /// Create a store with an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CacheEnvelope>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl FeedStore for InMemoryFeedStore {
    fn retrieve(&self, completion: RetrievalCompletion) {
        let outcome = match self.lock().clone() {
            Some(envelope) => CachedFeed::Found(envelope),
            None => CachedFeed::Empty,
        };
        completion(Ok(outcome));
    }

    fn insert(
        &self,
        records: Vec<FeedRecord>,
        saved_at: DateTime<Utc>,
        completion: WriteCompletion,
    ) {
        *self.lock() = Some(CacheEnvelope::new(records, saved_at));
        completion(Ok(()));
    }

    fn delete(&self, completion: WriteCompletion) {
        *self.lock() = None;
        completion(Ok(()));
    }
}
