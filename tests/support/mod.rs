//! Shared test support for the cache suites
//!
//! Provides:
//! - feed record fixtures
//! - blocking wrappers over the completion-callback store API
//! - `SpyStore`, a store double that records every message and lets the
//!   test complete each operation by hand (including after the caller
//!   has been dropped)
#![allow(dead_code)]

use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use photofeed_cache::loader::{LoadResult, LocalFeedCache, SaveResult};
use photofeed_cache::store::{
    FeedStore, RetrievalCompletion, RetrievalResult, WriteCompletion, WriteResult,
};
use photofeed_cache::FeedLoader;
use photofeed_model::FeedRecord;
use uuid::Uuid;

/// A record with every field populated.
pub fn make_record(description: &str) -> FeedRecord {
    FeedRecord::new(
        Uuid::new_v4(),
        Some(description.to_string()),
        Some("Kyoto".to_string()),
        "https://images.example.com/photo.png".parse().unwrap(),
    )
}

/// A small feed with distinct records, including one with absent
/// optional fields.
pub fn make_records() -> Vec<FeedRecord> {
    vec![
        make_record("temple at dawn"),
        FeedRecord::new(
            Uuid::new_v4(),
            None,
            None,
            "https://images.example.com/bare.png".parse().unwrap(),
        ),
    ]
}

/// Block until a retrieve completes.
pub fn retrieve_sync(store: &dyn FeedStore) -> RetrievalResult {
    let (tx, rx) = mpsc::channel();
    store.retrieve(Box::new(move |result| {
        let _ = tx.send(result);
    }));
    rx.recv().expect("retrieve completion never fired")
}

/// Block until an insert completes.
pub fn insert_sync(
    store: &dyn FeedStore,
    records: Vec<FeedRecord>,
    saved_at: DateTime<Utc>,
) -> WriteResult {
    let (tx, rx) = mpsc::channel();
    store.insert(
        records,
        saved_at,
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    rx.recv().expect("insert completion never fired")
}

/// Block until a delete completes.
pub fn delete_sync(store: &dyn FeedStore) -> WriteResult {
    let (tx, rx) = mpsc::channel();
    store.delete(Box::new(move |result| {
        let _ = tx.send(result);
    }));
    rx.recv().expect("delete completion never fired")
}

/// Block until a save completes.
pub fn save_sync(cache: &LocalFeedCache, records: Vec<FeedRecord>) -> SaveResult {
    let (tx, rx) = mpsc::channel();
    cache.save(
        records,
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    rx.recv().expect("save completion never fired")
}

/// Block until a load completes.
pub fn load_sync(cache: &LocalFeedCache) -> LoadResult {
    let (tx, rx) = mpsc::channel();
    cache.load(Box::new(move |result| {
        let _ = tx.send(result);
    }));
    rx.recv().expect("load completion never fired")
}

/// A decode-flavoured store error for stubbing retrieval failures.
pub fn stub_decode_error() -> photofeed_cache::StoreError {
    let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    photofeed_cache::StoreError::Decode(cause)
}

/// A deletion error for stubbing failed purges.
pub fn stub_delete_error() -> photofeed_cache::StoreError {
    photofeed_cache::StoreError::Delete(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "delete denied",
    ))
}

/// An insertion error for stubbing failed writes.
pub fn stub_write_error() -> photofeed_cache::StoreError {
    photofeed_cache::StoreError::Write(std::io::Error::new(
        std::io::ErrorKind::Other,
        "disk full",
    ))
}

/// Message recorded by the spy store, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Retrieve,
    Insert(Vec<FeedRecord>, DateTime<Utc>),
    Delete,
}

#[derive(Default)]
struct SpyInner {
    messages: Vec<Message>,
    retrievals: Vec<Option<RetrievalCompletion>>,
    insertions: Vec<Option<WriteCompletion>>,
    deletions: Vec<Option<WriteCompletion>>,
}

/// Store double that records messages and defers completions until the
/// test fires them explicitly.
#[derive(Default)]
pub struct SpyStore {
    inner: Mutex<SpyInner>,
}

impl SpyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, in issue order.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// Fire the `index`-th retrieval completion with `result`.
    pub fn complete_retrieval(&self, index: usize, result: RetrievalResult) {
        let completion = self.lock().retrievals[index]
            .take()
            .expect("retrieval already completed");
        completion(result);
    }

    /// Fire the `index`-th insertion completion with `result`.
    pub fn complete_insertion(&self, index: usize, result: WriteResult) {
        let completion = self.lock().insertions[index]
            .take()
            .expect("insertion already completed");
        completion(result);
    }

    /// Fire the `index`-th deletion completion with `result`.
    pub fn complete_deletion(&self, index: usize, result: WriteResult) {
        let completion = self.lock().deletions[index]
            .take()
            .expect("deletion already completed");
        completion(result);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SpyInner> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl FeedStore for SpyStore {
    fn retrieve(&self, completion: RetrievalCompletion) {
        let mut inner = self.lock();
        inner.messages.push(Message::Retrieve);
        inner.retrievals.push(Some(completion));
    }

    fn insert(
        &self,
        records: Vec<FeedRecord>,
        saved_at: DateTime<Utc>,
        completion: WriteCompletion,
    ) {
        let mut inner = self.lock();
        inner.messages.push(Message::Insert(records, saved_at));
        inner.insertions.push(Some(completion));
    }

    fn delete(&self, completion: WriteCompletion) {
        let mut inner = self.lock();
        inner.messages.push(Message::Delete);
        inner.deletions.push(Some(completion));
    }
}
