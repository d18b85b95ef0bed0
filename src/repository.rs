//! Repository Module
//!
//! The system of record a cache-aside service sits in front of, plus an
//! in-memory implementation with simulated latency.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::RepositoryError;

// == Repository Trait ==
/// Slow backing store that owns the authoritative copy of every value.
///
/// The cache is only an optimization over this; nothing lives solely in
/// the cache.
#[async_trait]
pub trait Repository: Send + Sync {
    type Key: Send + Sync;
    type Value: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads a value. `Ok(None)` means the key does not exist.
    async fn load(&self, key: &Self::Key) -> Result<Option<Self::Value>, Self::Error>;

    /// Writes a value to the system of record.
    async fn save(&self, key: &Self::Key, value: Self::Value) -> Result<(), Self::Error>;
}

// == In-Memory Repository ==
/// HashMap-backed repository that sleeps on every call to mimic a database.
///
/// Counts loads and saves, and can be switched to reject writes.
#[derive(Debug)]
pub struct InMemoryRepository<K, V> {
    records: RwLock<HashMap<K, V>>,
    latency: Duration,
    loads: AtomicUsize,
    saves: AtomicUsize,
    reject_writes: AtomicBool,
}

impl<K, V> InMemoryRepository<K, V>
where
    K: Hash + Eq,
{
    /// Creates an empty repository with the given per-call latency.
    pub fn new(latency: Duration) -> Self {
        Self::with_records(HashMap::new(), latency)
    }

    /// Creates a repository pre-populated with `records`.
    pub fn with_records(records: HashMap<K, V>, latency: Duration) -> Self {
        Self {
            records: RwLock::new(records),
            latency,
            loads: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Number of `load` calls served so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Makes subsequent saves fail with `RepositoryError::Unavailable`.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Reads a record directly, bypassing latency and counters.
    pub async fn snapshot(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.records.read().await.get(key).cloned()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl<K, V> Repository for InMemoryRepository<K, V>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    type Key = K;
    type Value = V;
    type Error = RepositoryError;

    async fn load(&self, key: &K) -> Result<Option<V>, RepositoryError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        debug!(latency_ms = self.latency.as_millis() as u64, "Repository load");
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn save(&self, key: &K, value: V) -> Result<(), RepositoryError> {
        self.simulate_latency().await;
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "writes are currently rejected".to_string(),
            ));
        }

        self.records.write().await.insert(key.clone(), value);
        self.saves.fetch_add(1, Ordering::SeqCst);
        debug!("Repository save");
        Ok(())
    }
}
