//! Photo Feed Domain Types
//!
//! Shared value types for the feed cache: the feed record itself, the
//! envelope persisted by stores, and the retrieval outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// A single photo feed entry.
///
/// Immutable value with structural equality. Records have no independent
/// lifecycle; they are always cached and evicted as part of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    /// Stable record identifier.
    pub id: Uuid,
    /// Caption text. Absent and empty are distinct states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the photo was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Where the image bytes live.
    pub image_url: Url,
}

impl FeedRecord {
    /// Create a record with all fields set.
    pub fn new(
        id: Uuid,
        description: Option<String>,
        location: Option<String>,
        image_url: Url,
    ) -> Self {
        Self {
            id,
            description,
            location,
            image_url,
        }
    }
}

/// The single persisted unit: all cached records plus the save timestamp.
///
/// Envelopes are wholly replaced on each save, never merged. A retrieve
/// after a successful insert returns a structurally equal envelope
/// (same record order, same timestamp to sub-second precision) until the
/// slot is overwritten or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEnvelope {
    /// Cached records in the order the caller supplied them.
    pub records: Vec<FeedRecord>,
    /// When the envelope was saved.
    pub saved_at: DateTime<Utc>,
}

impl CacheEnvelope {
    /// Create an envelope from records and their save timestamp.
    pub fn new(records: Vec<FeedRecord>, saved_at: DateTime<Utc>) -> Self {
        Self { records, saved_at }
    }
}

/// Outcome of retrieving the cache slot.
///
/// Unreadable or corrupt persisted data is not represented here; stores
/// report it as the error arm of their retrieval result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedFeed {
    /// No envelope is persisted.
    Empty,
    /// An envelope is persisted and was decoded successfully.
    Found(CacheEnvelope),
}

impl CachedFeed {
    /// The envelope, if one was found.
    pub fn envelope(&self) -> Option<&CacheEnvelope> {
        match self {
            CachedFeed::Empty => None,
            CachedFeed::Found(envelope) => Some(envelope),
        }
    }

    /// True when no envelope is persisted.
    pub fn is_empty(&self) -> bool {
        matches!(self, CachedFeed::Empty)
    }
}
