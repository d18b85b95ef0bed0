//! Aside Cache - A capacity-bounded in-memory cache
//!
//! Provides an LRU cache with lazy TTL expiration and a cache-aside service
//! that fronts a slower repository.

pub mod cache;
pub mod config;
pub mod error;
pub mod repository;
pub mod service;

pub use cache::{LruCache, SharedCache};
pub use config::Config;
pub use error::{CacheError, RepositoryError};
pub use repository::{InMemoryRepository, Repository};
pub use service::CacheAsideService;
