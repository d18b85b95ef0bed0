//! Cache Store Module
//!
//! Main cache engine combining a HashMap index with the recency list and TTL
//! expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, Clock, NodeId, RecencyList, SystemClock};
use crate::error::{CacheError, Result};

// == LRU Cache ==
/// Capacity-bounded cache with LRU eviction and lazy TTL expiration.
///
/// The index maps each key to a handle into the recency list; the list owns
/// the entries. A key is in the index iff its entry is linked in the list.
/// Expired entries are only removed when an operation touches them.
#[derive(Debug)]
pub struct LruCache<K, V, C = SystemClock> {
    /// Key -> node handle
    index: HashMap<K, NodeId>,
    /// Entries ordered by recency, owns all live entries
    list: RecencyList<K, V>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    clock: C,
}

impl<K, V> LruCache<K, V, SystemClock>
where
    K: Hash + Eq + Clone + Debug,
{
    // == Constructor ==
    /// Creates a new cache holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidCapacity` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_clock(capacity, SystemClock)
    }
}

impl<K, V, C> LruCache<K, V, C>
where
    K: Hash + Eq + Clone + Debug,
    C: Clock,
{
    /// Creates a new cache that reads time from `clock`.
    pub fn with_clock(capacity: usize, clock: C) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity { capacity });
        }

        info!(capacity, "LRU cache initialized");
        Ok(Self {
            index: HashMap::new(),
            list: RecencyList::new(),
            stats: CacheStats::new(),
            capacity,
            clock,
        })
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    ///
    /// Returns None if the key is absent or expired. An expired entry is
    /// removed on the spot.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let Some(&id) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if self.list.get(id).is_none_or(|entry| entry.is_expired(now)) {
            self.expire(id);
            self.stats.record_miss();
            return None;
        }

        self.list.move_to_front(id);
        self.stats.record_hit();
        self.list.get(id).map(|entry| &entry.value)
    }

    // == Set ==
    /// Stores a key-value pair with an optional TTL.
    ///
    /// Overwriting a live key replaces its value, resets the deadline only
    /// when `ttl` is given, and marks it most recently used. Inserting a new
    /// key into a full cache first evicts the least recently used entry.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional time to live, None = no expiration
    pub fn set(&mut self, key: K, value: V, ttl: Option<Duration>) {
        let now = self.clock.now();

        if let Some(&id) = self.index.get(&key) {
            if self.list.get(id).is_none_or(|entry| entry.is_expired(now)) {
                // Stale entries are replaced, never revived
                self.expire(id);
            } else {
                if let Some(entry) = self.list.get_mut(id) {
                    entry.refresh(value, ttl, now);
                }
                self.list.move_to_front(id);
                return;
            }
        }

        if self.list.len() >= self.capacity {
            self.evict_oldest();
        }

        let id = self.list.push_front(CacheEntry::new(key.clone(), value, ttl, now));
        self.index.insert(key, id);
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns whether an entry was removed; deleting an absent key is a
    /// no-op.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.remove(key) {
            Some(id) => {
                self.list.remove(id);
                true
            }
            None => false,
        }
    }

    // == Contains ==
    /// Checks whether a live entry exists for `key`.
    ///
    /// Does not change recency order. An expired entry found here is removed.
    pub fn contains<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let Some(&id) = self.index.get(key) else {
            return false;
        };

        if self.list.get(id).is_none_or(|entry| entry.is_expired(now)) {
            self.expire(id);
            return false;
        }
        true
    }

    // == Peek ==
    /// Returns a live value without touching recency or removing anything.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let id = self.index.get(key)?;
        self.list
            .get(*id)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| &entry.value)
    }

    // == Time To Live ==
    /// Returns the remaining TTL of a live entry.
    ///
    /// None if the key is absent, expired, or has no deadline.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let id = self.index.get(key)?;
        self.list
            .get(*id)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.ttl_remaining(now))
    }

    // == Keys By Recency ==
    /// Returns all keys, most recently used first.
    ///
    /// Expired entries that have not been touched yet are included.
    pub fn keys_by_recency(&self) -> Vec<K> {
        self.list.iter().map(|entry| entry.key.clone()).collect()
    }

    // == Clear ==
    /// Removes every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Capacity ==
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops the least recently used entry from both list and index.
    fn evict_oldest(&mut self) {
        if let Some(evicted) = self.list.pop_back() {
            self.index.remove(&evicted.key);
            self.stats.record_eviction();
            debug!(key = ?evicted.key, "Evicted least recently used entry");
        }
    }

    /// Drops an expired entry from both list and index.
    fn expire(&mut self, id: NodeId) {
        if let Some(expired) = self.list.remove(id) {
            self.index.remove(&expired.key);
            self.stats.record_expiration();
            debug!(key = ?expired.key, "Removed expired entry");
        }
    }
}
