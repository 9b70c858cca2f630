use std::time::Duration;

use async_trait::async_trait;

use crate::{CacheKey, Result};

/// Key-value snapshot cache.
///
/// Values are UTF-8 JSON documents. Invalidation only ever removes keys;
/// nothing in the data-access layer rewrites a cached value in place.
/// Implementations must be safe to share across tasks.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the value stored under `key`, or None on a miss or expiry.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>>;

    /// Stores `value` under `key` for `ttl`, tracking the key under its namespace.
    async fn set(&self, key: &CacheKey, value: String, ttl: Duration) -> Result<()>;

    /// Removes exactly the given keys. Returns how many were present.
    async fn delete(&self, keys: &[CacheKey]) -> Result<u64>;

    /// Removes every key tracked under `namespace`. Returns how many were present.
    async fn purge_namespace(&self, namespace: &str) -> Result<u64>;
}
