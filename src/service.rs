//! Cache-Aside Service
//!
//! Reads through the cache on miss and invalidates on write.
//!
//! The repository is always called with the cache lock released, so one slow
//! load never blocks other cache users. Two concurrent misses on the same key
//! may both load and both populate; the second `set` just overwrites the
//! first with an equal value.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{Clock, SharedCache, SystemClock};
use crate::repository::Repository;

// == Cache-Aside Service ==
/// Mediates between callers and a repository using a shared cache.
pub struct CacheAsideService<R, C = SystemClock>
where
    R: Repository,
{
    repository: Arc<R>,
    cache: SharedCache<R::Key, R::Value, C>,
    /// TTL applied to entries populated by `get_or_load`
    default_ttl: Option<Duration>,
}

impl<R, C> Clone for CacheAsideService<R, C>
where
    R: Repository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: self.cache.clone(),
            default_ttl: self.default_ttl,
        }
    }
}

impl<R, C> CacheAsideService<R, C>
where
    R: Repository,
    R::Key: Hash + Eq + Clone + Debug,
    R::Value: Clone,
    C: Clock,
{
    // == Constructor ==
    /// Creates a service over `repository` using `cache`.
    ///
    /// # Arguments
    /// * `repository` - System of record
    /// * `cache` - Cache instance, possibly shared with other consumers
    /// * `default_ttl` - TTL for loaded entries, None = no expiration
    pub fn new(
        repository: Arc<R>,
        cache: SharedCache<R::Key, R::Value, C>,
        default_ttl: Option<Duration>,
    ) -> Self {
        Self {
            repository,
            cache,
            default_ttl,
        }
    }

    // == Get Or Load ==
    /// Returns the value for `key`, loading it from the repository on miss.
    ///
    /// `Ok(None)` means the repository has no such key; that outcome is not
    /// cached. Repository errors are returned unchanged and leave the cache
    /// untouched.
    pub async fn get_or_load(&self, key: &R::Key) -> Result<Option<R::Value>, R::Error> {
        if let Some(value) = self.cache.get(key) {
            debug!(key = ?key, "Cache hit");
            return Ok(Some(value));
        }

        debug!(key = ?key, "Cache miss, loading from repository");
        match self.repository.load(key).await {
            Ok(Some(value)) => {
                self.cache.set(key.clone(), value.clone(), self.default_ttl);
                Ok(Some(value))
            }
            Ok(None) => {
                debug!(key = ?key, "Key not found in repository");
                Ok(None)
            }
            Err(err) => {
                warn!(key = ?key, error = %err, "Repository load failed");
                Err(err)
            }
        }
    }

    // == Update ==
    /// Writes `value` to the repository, then invalidates the cached copy.
    ///
    /// The cache is never written with the new value; the next read
    /// repopulates it. A failed write leaves the cache as it was.
    pub async fn update(&self, key: R::Key, value: R::Value) -> Result<(), R::Error> {
        if let Err(err) = self.repository.save(&key, value).await {
            warn!(key = ?key, error = %err, "Repository save failed, cache left untouched");
            return Err(err);
        }

        self.invalidate(&key);
        Ok(())
    }

    // == Invalidate ==
    /// Drops any cached copy of `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &R::Key) -> bool {
        let removed = self.cache.delete(key);
        if removed {
            debug!(key = ?key, "Invalidated cache entry");
        }
        removed
    }

    pub fn cache(&self) -> &SharedCache<R::Key, R::Value, C> {
        &self.cache
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::repository::InMemoryRepository;
    use std::collections::HashMap;

    type Repo = InMemoryRepository<String, String>;

    fn service_with(
        records: &[(&str, &str)],
        capacity: usize,
        ttl: Option<Duration>,
    ) -> (CacheAsideService<Repo, ManualClock>, ManualClock) {
        let records: HashMap<String, String> = records
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let repo = Arc::new(InMemoryRepository::with_records(records, Duration::ZERO));
        let clock = ManualClock::new();
        let cache = SharedCache::with_clock(capacity, clock.clone()).unwrap();
        (CacheAsideService::new(repo, cache, ttl), clock)
    }

    #[tokio::test]
    async fn test_round_trip_loads_once() {
        let (service, _) = service_with(&[("user:1", "alice")], 10, None);
        let key = "user:1".to_string();

        assert_eq!(service.get_or_load(&key).await.unwrap(), Some("alice".to_string()));
        assert_eq!(service.get_or_load(&key).await.unwrap(), Some("alice".to_string()));

        assert_eq!(service.repository().load_count(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let (service, _) = service_with(&[], 10, None);
        let key = "ghost".to_string();

        assert_eq!(service.get_or_load(&key).await.unwrap(), None);
        assert_eq!(service.get_or_load(&key).await.unwrap(), None);

        assert_eq!(service.repository().load_count(), 2);
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_update_invalidates() {
        let (service, _) = service_with(&[("user:1", "alice")], 10, None);
        let key = "user:1".to_string();

        service.get_or_load(&key).await.unwrap();
        service.update(key.clone(), "bob".to_string()).await.unwrap();

        assert!(!service.cache().contains(&key));
        assert_eq!(service.get_or_load(&key).await.unwrap(), Some("bob".to_string()));
        assert_eq!(service.repository().load_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_cached_value() {
        let (service, _) = service_with(&[("user:1", "alice")], 10, None);
        let key = "user:1".to_string();

        service.get_or_load(&key).await.unwrap();
        service.repository().set_reject_writes(true);

        assert!(service.update(key.clone(), "bob".to_string()).await.is_err());
        assert_eq!(service.get_or_load(&key).await.unwrap(), Some("alice".to_string()));
        assert_eq!(service.repository().load_count(), 1);
    }

    #[tokio::test]
    async fn test_default_ttl_applies_to_loaded_entries() {
        let (service, clock) = service_with(&[("k", "v")], 10, Some(Duration::from_secs(30)));
        let key = "k".to_string();

        service.get_or_load(&key).await.unwrap();
        clock.advance(Duration::from_secs(30));
        service.get_or_load(&key).await.unwrap();

        assert_eq!(service.repository().load_count(), 2);
        assert_eq!(service.default_ttl(), Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_invalidate_absent_key() {
        let (service, _) = service_with(&[], 10, None);
        assert!(!service.invalidate(&"nothing".to_string()));
    }
}
