//! Keyed, time-expiring cache for whole endpoint responses.
//!
//! Fills are single-flight per key: while one request computes a missing
//! value, concurrent requests for the same key wait on the key's lock and then
//! read the stored result instead of hitting the upstream again.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    cached_at: Instant,
}

pub struct ResponseCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    fill_locks: DashMap<String, Arc<Mutex<()>>>,
    ttl: Duration,
    capacity: usize,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            fill_locks: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh value for `key`, dropping it if expired.
    pub fn get(&self, key: &str) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if entry.cached_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
        }
        self.entries
            .remove_if(key, |_, entry| entry.cached_at.elapsed() >= self.ttl);
        None
    }

    pub fn insert(&self, key: &str, value: V) {
        if !self.entries.contains_key(key) && self.entries.len() >= self.capacity {
            self.evict_for_insert();
        }
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop expired entries, then the oldest one if still at capacity.
    fn evict_for_insert(&self) {
        self.entries
            .retain(|_, entry| entry.cached_at.elapsed() < self.ttl);
        if self.entries.len() < self.capacity {
            return;
        }
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().cached_at)
            .map(|e| e.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    /// Return the cached value or compute, store and return it.
    ///
    /// Errors are returned to the caller and nothing is stored.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, fill: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            tracing::debug!("Cache hit for '{}'", key);
            return Ok(value);
        }

        let lock = self
            .fill_locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another request may have filled the key while we waited.
        if let Some(value) = self.get(key) {
            tracing::debug!("Cache filled concurrently for '{}'", key);
            return Ok(value);
        }

        tracing::info!("Cache miss for '{}', computing", key);
        let value = fill().await?;
        self.insert(key, value.clone());
        Ok(value)
    }
}
