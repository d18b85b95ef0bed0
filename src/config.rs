//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::SharedCache;
use crate::error::Result;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// TTL for entries populated by the cache-aside service, None = never expire
    pub default_ttl: Option<Duration>,
    /// Simulated latency of the demo repository
    pub repo_latency: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds, 0 disables TTL (default: 300)
    /// - `REPO_LATENCY_MS` - Simulated repository latency (default: 50)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: parse_var("CACHE_CAPACITY").unwrap_or(defaults.capacity),
            default_ttl: match parse_var::<u64>("DEFAULT_TTL") {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.default_ttl,
            },
            repo_latency: parse_var("REPO_LATENCY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.repo_latency),
        }
    }

    /// Builds the cache instance described by this configuration.
    ///
    /// # Errors
    /// Fails if `capacity` is zero.
    pub fn build_cache<K, V>(&self) -> Result<SharedCache<K, V>>
    where
        K: Hash + Eq + Clone + Debug,
    {
        SharedCache::new(self.capacity)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_ttl: Some(Duration::from_secs(300)),
            repo_latency: Duration::from_millis(50),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
