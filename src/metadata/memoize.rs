//! Time-bounded memoization of async lookups

use crate::error::Result;
use dashmap::DashMap;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

type Lookup<K, V> = Box<dyn Fn(K) -> BoxFuture<'static, Result<V>> + Send + Sync>;

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub api_errors: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> u32 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f32 / total as f32 * 100.0) as u32
        } else {
            0
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    api_errors: AtomicU64,
}

/// A resolved value and the moment it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub created_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    /// Check if this entry is still visible (younger than TTL)
    pub fn is_live(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }
}

/// Wraps an async `K -> V` lookup with a TTL-bounded cache.
///
/// A live entry is returned without calling the lookup. On a miss or an
/// expired entry the lookup runs and its value is stored with a fresh
/// timestamp. Failed lookups are never cached, so the next call retries.
///
/// Concurrent misses on the same key may each call the lookup; the last
/// one to finish wins the slot.
pub struct Memoizer<K, V> {
    /// Label used in logs
    name: &'static str,
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    lookup: Lookup<K, V>,
    counters: Counters,
}

impl<K, V> Memoizer<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(name: &'static str, ttl: Duration, lookup: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        tracing::info!(cache = name, ttl_secs = ttl.as_secs(), "Creating memoizer");

        Self {
            name,
            entries: DashMap::new(),
            ttl,
            lookup: Box::new(move |key| lookup(key).boxed()),
            counters: Counters::default(),
        }
    }

    /// Get the value for `key`, calling the lookup only when no live entry exists
    pub async fn get(&self, key: &K) -> Result<V> {
        if let Some(value) = self.peek(key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(cache = self.name, key = ?key, "Cache hit");
            return Ok(value);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(cache = self.name, key = ?key, "Cache miss, running lookup");

        match (self.lookup)(key.clone()).await {
            Ok(value) => {
                self.entries
                    .insert(key.clone(), CacheEntry::new(value.clone()));
                Ok(value)
            }
            Err(e) => {
                self.counters.api_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    cache = self.name,
                    key = ?key,
                    error = %e,
                    "Lookup failed, nothing cached"
                );
                Err(e)
            }
        }
    }

    /// Live cached value for `key`, without running the lookup
    pub fn peek(&self, key: &K) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Drop the entry for `key`, forcing the next `get` to run the lookup
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Physically remove expired entries, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(ttl));
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            tracing::debug!(
                cache = self.name,
                removed = removed,
                remaining = self.entries.len(),
                "Purged expired cache entries"
            );
        }
        removed
    }

    /// Number of stored entries, expired ones included until purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            api_errors: self.counters.api_errors.load(Ordering::Relaxed),
        }
    }

    /// Log cache statistics (for periodic monitoring)
    pub fn log_stats(&self) {
        let stats = self.stats();
        tracing::info!(
            cache = self.name,
            cached = self.entries.len(),
            hit_rate = stats.hit_rate(),
            misses = stats.misses,
            api_errors = stats.api_errors,
            "Cache statistics"
        );
    }
}
