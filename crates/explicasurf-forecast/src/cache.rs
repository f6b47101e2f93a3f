//! In-memory request cache keyed by the user's selection.
//!
//! One cache is built per session and shared by reference. Failed fetches are
//! never stored, so the next request for the same selection retries.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use explicasurf_core::CacheConfig;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::types::Selection;

/// Bounds on what the cache keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// Capacity; the least recently used entry is evicted when full
    pub max_entries: Option<usize>,
    /// Age after which an entry counts as a miss
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    /// Keep everything for the whole session.
    pub fn unbounded() -> Self {
        Self::default()
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            max_entries: config.max_entries.filter(|n| *n > 0),
            ttl: config
                .ttl_minutes
                .map(|m| Duration::from_secs(m.saturating_mul(60))),
        }
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    last_access: Instant,
}

#[derive(Debug)]
pub struct ForecastCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    policy: CachePolicy,
}

impl<V: Clone> ForecastCache<V> {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// Return the cached value for `selection`, or run `fetcher` and cache its success.
    ///
    /// The lock is released while `fetcher` runs, so fetches for different
    /// selections proceed concurrently.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error unchanged; nothing is cached in that case.
    pub async fn get_or_fetch<F, Fut, E>(&self, selection: &Selection, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = selection.cache_key();

        if let Some(value) = self.get(&key) {
            tracing::debug!("Forecast cache hit: {}", key);
            return Ok(value);
        }

        tracing::debug!("Forecast cache miss: {}", key);
        let value = fetcher().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Look up a key, honouring the TTL.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        let expired = match (entries.get(key), self.policy.ttl) {
            (Some(entry), Some(ttl)) => now.duration_since(entry.created_at) >= ttl,
            _ => false,
        };
        if expired {
            tracing::debug!("Forecast cache entry expired: {}", key);
            entries.remove(key);
            return None;
        }

        entries.get_mut(key).map(|entry| {
            entry.last_access = now;
            entry.value.clone()
        })
    }

    /// Store a value, evicting the least recently used entry if full.
    pub fn insert(&self, key: String, value: V) {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        if let Some(max) = self.policy.max_entries {
            if !entries.contains_key(&key) && entries.len() >= max {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.last_access)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    tracing::debug!("Evicting forecast cache entry: {}", oldest);
                    entries.remove(&oldest);
                }
            }
        }

        tracing::info!("Cached forecast: {}", key);
        entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
                last_access: now,
            },
        );
    }

    pub fn invalidate(&self, selection: &Selection) -> bool {
        self.entries.lock().remove(&selection.cache_key()).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn contains(&self, selection: &Selection) -> bool {
        self.entries.lock().contains_key(&selection.cache_key())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }
}
