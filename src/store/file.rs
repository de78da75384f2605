//! File-backed feed store
//!
//! Persists the envelope as a single JSON file:
//! `{ schema_version, schema_id, records, saved_at }` with RFC 3339
//! timestamps. The whole file is replaced on every insert via a
//! write-to-temp-then-rename in the same directory, so readers never
//! observe a partially written envelope.
//!
//! Outcome mapping for retrieval:
//! - file missing or unreadable → `Empty`
//! - bytes present but undecodable or wrong schema → `Err`
//! - otherwise → `Found`
//!
//! All operations go through a [`ReadWriteQueue`](super::exec): retrieves
//! may overlap, inserts and deletes run alone and in submission order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use photofeed_model::{CacheEnvelope, CachedFeed, FeedRecord};
use serde::{Deserialize, Serialize};

use super::exec::ReadWriteQueue;
use super::{FeedStore, RetrievalCompletion, RetrievalResult, StoreError, WriteCompletion, WriteResult};

/// Schema version for the envelope file.
const SCHEMA_VERSION: u32 = 1;

/// Schema identifier written alongside the version.
const SCHEMA_ID: &str = "photofeed/cache-envelope@1";

/// Counter for unique temp file names within this process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// On-disk envelope encoding.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEnvelope {
    schema_version: u32,
    schema_id: String,
    records: Vec<FeedRecord>,
    saved_at: DateTime<Utc>,
}

/// Feed store backed by a single file on a durable filesystem.
///
/// One instance exclusively owns its path; concurrent instances pointed
/// at the same file are unsupported (no cross-instance locking).
/// Dropping the store drains pending operations first.
pub struct FileFeedStore {
    path: Arc<PathBuf>,
    queue: ReadWriteQueue,
}

impl FileFeedStore {
    /// Open a store over the given envelope file.
    ///
    /// Creates missing parent directories and spawns the execution queue.
    /// The file itself is created lazily on the first insert.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StoreError::OpenStore)?;
            }
        }

        let queue = ReadWriteQueue::new("photofeed-store").map_err(StoreError::OpenStore)?;

        Ok(Self {
            path: Arc::new(path),
            queue,
        })
    }

    /// Path of the envelope file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedStore for FileFeedStore {
    fn retrieve(&self, completion: RetrievalCompletion) {
        let path = Arc::clone(&self.path);
        self.queue.read(move || completion(read_slot(&path)));
    }

    fn insert(
        &self,
        records: Vec<FeedRecord>,
        saved_at: DateTime<Utc>,
        completion: WriteCompletion,
    ) {
        let path = Arc::clone(&self.path);
        self.queue
            .write(move || completion(write_slot(&path, records, saved_at)));
    }

    fn delete(&self, completion: WriteCompletion) {
        let path = Arc::clone(&self.path);
        self.queue.write(move || completion(delete_slot(&path)));
    }
}

fn read_slot(path: &Path) -> RetrievalResult {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        // Missing or unreadable file means no usable slot.
        Err(_) => return Ok(CachedFeed::Empty),
    };

    let stored: StoredEnvelope = serde_json::from_slice(&bytes).map_err(StoreError::Decode)?;
    if stored.schema_version != SCHEMA_VERSION {
        return Err(StoreError::Schema {
            found: stored.schema_version,
        });
    }

    Ok(CachedFeed::Found(CacheEnvelope::new(
        stored.records,
        stored.saved_at,
    )))
}

fn write_slot(path: &Path, records: Vec<FeedRecord>, saved_at: DateTime<Utc>) -> WriteResult {
    let stored = StoredEnvelope {
        schema_version: SCHEMA_VERSION,
        schema_id: SCHEMA_ID.to_string(),
        records,
        saved_at,
    };
    let json = serde_json::to_string_pretty(&stored).map_err(StoreError::Encode)?;

    // Write to a unique sibling, then rename over the slot so the old
    // envelope stays intact until the new one is committed whole.
    let temp_path = temp_sibling(path);
    fs::write(&temp_path, json).map_err(StoreError::Write)?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::Write(e));
    }

    Ok(())
}

fn delete_slot(path: &Path) -> WriteResult {
    if !path.exists() {
        return Ok(());
    }

    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        // Lost a race with an external remove; the slot is gone either way.
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::Delete(e)),
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "envelope".to_string());
    let temp_name = format!(
        ".{}.tmp.{}.{}",
        file_name,
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::SeqCst)
    );
    path.with_file_name(temp_name)
}
