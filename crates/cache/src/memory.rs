use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::{Cache, CacheError, CacheKey, Result};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: DashMap<String, Entry>,
    namespaces: DashMap<String, HashSet<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    gets: AtomicU64,
    sets: AtomicU64,
}

/// Process-local cache for single-node deployments and tests.
///
/// Every stored key is tracked under its namespace, so
/// [`purge_namespace`](Cache::purge_namespace) deletes exactly the keys that
/// were written instead of scanning for a pattern.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    inner: Arc<Inner>,
}

impl InMemoryCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent reads fail as if the backend were unreachable.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent writes fail as if the backend were unreachable.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns true if a live entry exists for `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner
            .entries
            .get(key.as_str())
            .is_some_and(|e| e.expires_at > Instant::now())
    }

    /// Returns the number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Returns the number of GET calls served.
    pub fn get_count(&self) -> u64 {
        self.inner.gets.load(Ordering::SeqCst)
    }

    /// Returns the number of SET calls served.
    pub fn set_count(&self) -> u64 {
        self.inner.sets.load(Ordering::SeqCst)
    }

    /// Returns the number of keys tracked across all namespaces.
    pub fn tracked_len(&self) -> usize {
        self.inner.namespaces.iter().map(|set| set.len()).sum()
    }

    /// Removes every expired entry and stops tracking its key.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut expired = Vec::new();
        self.inner.entries.retain(|key, entry| {
            let live = entry.expires_at > now;
            if !live {
                expired.push(key.clone());
            }
            live
        });

        for key in &expired {
            let namespace = key.split(':').next().unwrap_or_default();
            if let Some(mut tracked) = self.inner.namespaces.get_mut(namespace) {
                // A concurrent set may have written the key again.
                if !self.inner.entries.contains_key(key) {
                    tracked.remove(key);
                }
            }
            self.inner
                .namespaces
                .remove_if(namespace, |_, tracked| tracked.is_empty());
        }

        expired.len()
    }

    /// Spawns a task that calls [`evict_expired`](Self::evict_expired) every `period`.
    ///
    /// The task runs until the returned handle is aborted.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = cache.evict_expired();
                if evicted > 0 {
                    metrics::counter!("cache_evictions_total").increment(evicted as u64);
                    tracing::debug!(evicted, "expired cache entries evicted");
                }
            }
        })
    }

    /// Clears all entries and namespace tracking.
    pub fn clear(&self) {
        self.inner.namespaces.clear();
        self.inner.entries.clear();
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("reads disabled".to_string()));
        }
        self.inner.gets.fetch_add(1, Ordering::SeqCst);

        let now = Instant::now();
        if let Some(entry) = self.inner.entries.get(key.as_str()) {
            if entry.expires_at > now {
                return Ok(Some(entry.value.clone()));
            }
        }

        // Lazily evict the expired entry
        self.inner
            .entries
            .remove_if(key.as_str(), |_, e| e.expires_at <= now);
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: String, ttl: Duration) -> Result<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("writes disabled".to_string()));
        }
        self.inner.sets.fetch_add(1, Ordering::SeqCst);

        // The namespace shard stays locked while the entry is written so a
        // concurrent purge cannot miss it.
        let mut tracked = self
            .inner
            .namespaces
            .entry(key.namespace().to_string())
            .or_default();
        tracked.insert(key.as_str().to_string());
        self.inner.entries.insert(
            key.as_str().to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        drop(tracked);

        Ok(())
    }

    async fn delete(&self, keys: &[CacheKey]) -> Result<u64> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("writes disabled".to_string()));
        }

        let mut removed = 0;
        for key in keys {
            // Same lock order as `set`: namespace shard, then the entry.
            let tracked = self.inner.namespaces.get_mut(key.namespace());
            if let Some(mut tracked) = tracked {
                tracked.remove(key.as_str());
                if self.inner.entries.remove(key.as_str()).is_some() {
                    removed += 1;
                }
            } else if self.inner.entries.remove(key.as_str()).is_some() {
                removed += 1;
            }
        }

        tracing::debug!(keys = keys.len(), removed, "cache keys deleted");
        Ok(removed)
    }

    async fn purge_namespace(&self, namespace: &str) -> Result<u64> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("writes disabled".to_string()));
        }

        let Some((_, tracked)) = self.inner.namespaces.remove(namespace) else {
            return Ok(0);
        };

        let mut removed = 0;
        for key in tracked {
            if self.inner.entries.remove(&key).is_some() {
                removed += 1;
            }
        }

        metrics::counter!("cache_namespace_purges_total", "namespace" => namespace.to_string())
            .increment(1);
        tracing::debug!(namespace, removed, "cache namespace purged");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SNAPSHOT_TTL;

    #[tokio::test]
    async fn get_returns_stored_value() {
        let cache = InMemoryCache::new();
        let key = CacheKey::by_id("agent", 5);

        cache.set(&key, "{\"id\":5}".to_string(), SNAPSHOT_TTL).await.unwrap();

        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("{\"id\":5}"));
    }

    #[tokio::test]
    async fn get_on_missing_key_is_a_miss() {
        let cache = InMemoryCache::new();
        assert!(cache.get(&CacheKey::by_id("agent", 1)).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryCache::new();
        let key = CacheKey::by_id("agent", 5);
        cache.set(&key, "v".to_string(), Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get(&key).await.unwrap().is_none());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn delete_removes_exact_keys_only() {
        let cache = InMemoryCache::new();
        let a = CacheKey::by_id("sales_order", 1);
        let b = CacheKey::by_id("sales_order", 2);
        cache.set(&a, "a".to_string(), SNAPSHOT_TTL).await.unwrap();
        cache.set(&b, "b".to_string(), SNAPSHOT_TTL).await.unwrap();

        let removed = cache.delete(std::slice::from_ref(&a)).await.unwrap();

        assert_eq!(removed, 1);
        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));
    }

    #[tokio::test]
    async fn purge_namespace_removes_every_tracked_key() {
        let cache = InMemoryCache::new();
        let keys = [
            CacheKey::by_id("delivery_order", 1),
            CacheKey::by_id("delivery_order", 2),
            CacheKey::by_field("delivery_order", "do_code", "DO-1"),
        ];
        for key in &keys {
            cache.set(key, "x".to_string(), SNAPSHOT_TTL).await.unwrap();
        }
        let other = CacheKey::by_id("delivery_order_detail", 1);
        cache.set(&other, "y".to_string(), SNAPSHOT_TTL).await.unwrap();

        let removed = cache.purge_namespace("delivery_order").await.unwrap();

        assert_eq!(removed, 3);
        for key in &keys {
            assert!(!cache.contains(key));
        }
        assert!(cache.contains(&other));
    }

    #[tokio::test]
    async fn purge_of_unknown_namespace_is_a_no_op() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.purge_namespace("nothing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn keys_written_after_purge_are_tracked_again() {
        let cache = InMemoryCache::new();
        let key = CacheKey::by_id("store", 9);
        cache.set(&key, "1".to_string(), SNAPSHOT_TTL).await.unwrap();
        cache.purge_namespace("store").await.unwrap();

        cache.set(&key, "2".to_string(), SNAPSHOT_TTL).await.unwrap();
        assert_eq!(cache.purge_namespace("store").await.unwrap(), 1);
        assert!(!cache.contains(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn evict_expired_untracks_keys() {
        let cache = InMemoryCache::new();
        for id in 0..100 {
            let ttl = if id % 2 == 0 { Duration::from_secs(1) } else { SNAPSHOT_TTL };
            cache.set(&CacheKey::by_id("brand", id), "b".to_string(), ttl).await.unwrap();
        }

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.evict_expired(), 50);
        assert_eq!(cache.len(), 50);
        assert_eq!(cache.tracked_len(), 50);
        assert!(cache.contains(&CacheKey::by_id("brand", 1)));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_without_reads() {
        let cache = InMemoryCache::new();
        for id in 0..1000 {
            let key = CacheKey::by_id("sales_order", id);
            cache.set(&key, "x".to_string(), Duration::from_secs(1)).await.unwrap();
        }
        let sweeper = cache.spawn_sweeper(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(cache.is_empty());
        assert_eq!(cache.tracked_len(), 0);
        assert_eq!(cache.get_count(), 0);
        sweeper.abort();
    }

    #[tokio::test]
    async fn delete_then_set_keeps_key_purgeable() {
        let cache = InMemoryCache::new();
        let key = CacheKey::by_id("warehouse", 3);
        cache.set(&key, "1".to_string(), SNAPSHOT_TTL).await.unwrap();

        cache.delete(std::slice::from_ref(&key)).await.unwrap();
        cache.set(&key, "2".to_string(), SNAPSHOT_TTL).await.unwrap();

        assert_eq!(cache.tracked_len(), 1);
        assert_eq!(cache.purge_namespace("warehouse").await.unwrap(), 1);
        assert!(!cache.contains(&key));
    }

    #[tokio::test]
    async fn failure_injection() {
        let cache = InMemoryCache::new();
        let key = CacheKey::by_id("agent", 1);

        cache.set_fail_writes(true);
        assert!(cache.set(&key, "x".to_string(), SNAPSHOT_TTL).await.is_err());
        assert!(cache.purge_namespace("agent").await.is_err());

        cache.set_fail_writes(false);
        cache.set_fail_reads(true);
        assert!(cache.get(&key).await.is_err());
    }
}
