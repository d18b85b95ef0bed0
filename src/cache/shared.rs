//! Shared Cache Module
//!
//! Thread-safe handle around a single [`LruCache`].

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::{CacheStats, Clock, LruCache, SystemClock};
use crate::error::Result;

// == Shared Cache ==
/// Cloneable, thread-safe handle to one cache instance.
///
/// A single mutex guards the index and the recency list together. Each call
/// holds the lock only for its own duration and never across an await point,
/// so the handle can be used freely from async code.
#[derive(Debug)]
pub struct SharedCache<K, V, C = SystemClock> {
    inner: Arc<Mutex<LruCache<K, V, C>>>,
}

impl<K, V, C> Clone for SharedCache<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V, SystemClock>
where
    K: Hash + Eq + Clone + Debug,
{
    /// Creates a shared cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self> {
        LruCache::new(capacity).map(Self::from_store)
    }
}

impl<K, V, C> SharedCache<K, V, C>
where
    K: Hash + Eq + Clone + Debug,
    C: Clock,
{
    /// Creates a shared cache that reads time from `clock`.
    pub fn with_clock(capacity: usize, clock: C) -> Result<Self> {
        LruCache::with_clock(capacity, clock).map(Self::from_store)
    }

    /// Wraps an existing engine.
    pub fn from_store(store: LruCache<K, V, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Returns a clone of the live value for `key`, marking it most
    /// recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    pub fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        self.inner.lock().set(key, value, ttl);
    }

    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().delete(key)
    }

    /// Touch-free existence check.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains(key)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Runs `f` with exclusive access to the engine.
    ///
    /// Useful for compound operations that must observe a consistent state.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut LruCache<K, V, C>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::thread;

    #[test]
    fn test_clones_share_state() {
        let cache: SharedCache<String, u32> = SharedCache::new(10).unwrap();
        let other = cache.clone();

        cache.set("a".to_string(), 1, None);

        assert_eq!(other.get("a"), Some(1));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(SharedCache::<String, u32>::new(0).is_err());
    }

    #[test]
    fn test_shared_ttl_expiration() {
        let clock = ManualClock::new();
        let cache = SharedCache::with_clock(10, clock.clone()).unwrap();

        cache.set("a", 1, Some(Duration::from_secs(1)));
        assert!(cache.contains("a"));

        clock.advance(Duration::from_secs(1));

        assert!(!cache.contains("a"));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_with_store_sees_recency_order() {
        let cache = SharedCache::new(3).unwrap();
        cache.set("a", 1, None);
        cache.set("b", 2, None);
        cache.get("a");

        let order = cache.with_store(|store| store.keys_by_recency());
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_concurrent_writers_respect_capacity() {
        let cache: SharedCache<String, usize> = SharedCache::new(16).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        cache.set(format!("{}-{}", t, i), i, None);
                        let _ = cache.get(&format!("{}-{}", t, i / 2));
                        assert!(cache.len() <= 16);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 16);
        assert_eq!(cache.stats().evictions, 8 * 200 - 16);
    }
}
