//! Cache Module
//!
//! Provides in-memory caching with LRU eviction and lazy TTL expiration.

mod clock;
mod entry;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use lru::{NodeId, RecencyIter, RecencyList};
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::LruCache;
