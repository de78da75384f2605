//! Feed store contract
//!
//! A store persists a single envelope slot and exposes three asynchronous
//! operations: retrieve, insert (full replace), and delete (idempotent).
//! Results are delivered through completion callbacks which may run on
//! any thread; callers must not assume the calling thread.
//!
//! Sequencing contract for one store instance:
//! - writes (insert/delete) complete in submission order
//! - writes never run concurrently with each other or with reads
//! - reads may run concurrently with other reads

mod exec;
mod file;
mod memory;

pub use file::FileFeedStore;
pub use memory::InMemoryFeedStore;

use std::io;

use chrono::{DateTime, Utc};
use photofeed_model::{CachedFeed, FeedRecord};
use thiserror::Error;

/// Store result type for write operations.
pub type WriteResult = Result<(), StoreError>;

/// Store result type for retrieval.
pub type RetrievalResult = Result<CachedFeed, StoreError>;

/// Completion callback for retrieval.
pub type RetrievalCompletion = Box<dyn FnOnce(RetrievalResult) + Send + 'static>;

/// Completion callback for insert and delete.
pub type WriteCompletion = Box<dyn FnOnce(WriteResult) + Send + 'static>;

/// Errors from store operations.
///
/// Causes are preserved verbatim; orchestration layers propagate these
/// without rewrapping.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to decode cache envelope: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("unsupported cache envelope schema (found version {found})")]
    Schema { found: u32 },

    #[error("failed to encode cache envelope: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write cache envelope: {0}")]
    Write(#[source] io::Error),

    #[error("failed to delete cache envelope: {0}")]
    Delete(#[source] io::Error),

    #[error("failed to open store: {0}")]
    OpenStore(#[source] io::Error),
}

/// Durable persistence for a single envelope slot.
///
/// Object-safe; consumed as `Arc<dyn FeedStore>` so orchestration and
/// chained completions can share one instance.
pub trait FeedStore: Send + Sync {
    /// Read the current slot.
    ///
    /// Never fails synchronously: a missing slot is `Ok(Empty)`, corrupt
    /// persisted data is `Err` with the decode cause.
    fn retrieve(&self, completion: RetrievalCompletion);

    /// Replace the slot with a new envelope.
    fn insert(
        &self,
        records: Vec<FeedRecord>,
        saved_at: DateTime<Utc>,
        completion: WriteCompletion,
    );

    /// Remove the slot. Deleting an absent slot succeeds.
    fn delete(&self, completion: WriteCompletion);
}
