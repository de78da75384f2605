//! Photo Feed Cache
//!
//! Local, time-bounded cache for photo feed metadata: a durable
//! single-slot store with serialized writes, a seven-day freshness
//! policy, and the save/load/validate use cases on top.

pub mod clock;
pub mod loader;
pub mod policy;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use loader::{FeedLoader, LoadResult, LocalFeedCache, SaveResult};
pub use photofeed_model::{CacheEnvelope, CachedFeed, FeedRecord};
pub use store::{FeedStore, FileFeedStore, InMemoryFeedStore, StoreError};
