//! Save / Load / Validate use cases
//!
//! [`LocalFeedCache`] composes a store, the freshness policy, and a clock
//! into three independent request/response flows:
//! - save: delete the old envelope, then insert the new one
//! - load: retrieve and apply the policy; stale data reads as empty
//! - validate: retrieve and purge unreadable or stale envelopes
//!
//! Store errors surface verbatim to save/load callers. Validate is
//! fire-and-forget; its purge outcome is logged, never reported.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use photofeed_model::{CachedFeed, FeedRecord};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::policy;
use crate::store::{FeedStore, StoreError};

/// Result delivered to save completions.
pub type SaveResult = Result<(), StoreError>;

/// Completion callback for save.
pub type SaveCompletion = Box<dyn FnOnce(SaveResult) + Send + 'static>;

/// Result delivered to load completions.
pub type LoadResult = Result<Vec<FeedRecord>, StoreError>;

/// Completion callback for load.
pub type LoadCompletion = Box<dyn FnOnce(LoadResult) + Send + 'static>;

/// Load-side interface consumed by downstream collaborators.
pub trait FeedLoader {
    /// Load the currently usable feed.
    ///
    /// The completion may run on any thread. An expired cache yields
    /// `Ok` with no records, not an error.
    fn load(&self, completion: LoadCompletion);
}

/// Orchestrator for the local feed cache.
///
/// Once the cache is dropped, completions for operations still in flight
/// are silently discarded; callbacks never outlive their issuer.
pub struct LocalFeedCache {
    store: Arc<dyn FeedStore>,
    clock: Arc<dyn Clock>,
    alive: Arc<AtomicBool>,
}

impl LocalFeedCache {
    /// Create a cache over the given store and clock.
    pub fn new(store: Arc<dyn FeedStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Replace the cached feed with `records`, stamped with the clock's
    /// current time.
    ///
    /// The previous envelope is deleted first; if that fails, the insert
    /// is never issued and the completion receives the deletion error.
    pub fn save(&self, records: Vec<FeedRecord>, completion: SaveCompletion) {
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);
        let alive = Arc::clone(&self.alive);

        self.store.delete(Box::new(move |deletion| {
            if !alive.load(Ordering::SeqCst) {
                return;
            }
            match deletion {
                Err(e) => completion(Err(e)),
                Ok(()) => {
                    let alive = Arc::clone(&alive);
                    store.insert(
                        records,
                        clock.now(),
                        Box::new(move |insertion| {
                            if alive.load(Ordering::SeqCst) {
                                completion(insertion);
                            }
                        }),
                    );
                }
            }
        }));
    }

    /// Purge the slot when its envelope is unreadable or expired.
    ///
    /// Retrieval and deletion failures are swallowed; an unreadable cache
    /// is simply treated as gone.
    pub fn validate(&self) {
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);
        let alive = Arc::clone(&self.alive);

        self.store.retrieve(Box::new(move |outcome| {
            if !alive.load(Ordering::SeqCst) {
                return;
            }
            let reason = match outcome {
                Err(_) => Some("unreadable"),
                Ok(CachedFeed::Found(envelope))
                    if !policy::is_valid(envelope.saved_at, clock.now()) =>
                {
                    Some("expired")
                }
                Ok(_) => None,
            };

            if let Some(reason) = reason {
                debug!(reason, "purging cache slot");
                store.delete(Box::new(|result| {
                    if let Err(e) = result {
                        warn!(error = %e, "cache purge failed");
                    }
                }));
            }
        }));
    }
}

impl FeedLoader for LocalFeedCache {
    fn load(&self, completion: LoadCompletion) {
        let clock = Arc::clone(&self.clock);
        let alive = Arc::clone(&self.alive);

        self.store.retrieve(Box::new(move |outcome| {
            if !alive.load(Ordering::SeqCst) {
                return;
            }
            match outcome {
                Err(e) => completion(Err(e)),
                Ok(CachedFeed::Found(envelope))
                    if policy::is_valid(envelope.saved_at, clock.now()) =>
                {
                    completion(Ok(envelope.records))
                }
                // Empty slot, or an envelope past its maximum age.
                Ok(_) => completion(Ok(Vec::new())),
            }
        }));
    }
}

impl Drop for LocalFeedCache {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
