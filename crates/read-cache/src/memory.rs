//! In-memory cache backend.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{CacheBackend, CacheError, Result};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Default)]
struct InMemoryCacheState {
    entries: HashMap<String, CacheEntry>,
    fail_on_get: bool,
    fail_on_set: bool,
    fail_on_remove: bool,
}

/// Process-local cache backend.
///
/// Expiry follows the tokio clock, so tests can pause and advance time.
/// Failure toggles let callers exercise their degraded paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReadCache {
    state: Arc<RwLock<InMemoryCacheState>>,
}

impl InMemoryReadCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, InMemoryCacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, InMemoryCacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the cache to fail every get.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.write().fail_on_get = fail;
    }

    /// Configures the cache to fail every set.
    pub fn set_fail_on_set(&self, fail: bool) {
        self.write().fail_on_set = fail;
    }

    /// Configures the cache to fail every remove.
    pub fn set_fail_on_remove(&self, fail: bool) {
        self.write().fail_on_remove = fail;
    }

    /// Returns true if a live entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.read()
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.read()
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn stored_len(&self) -> usize {
        self.read().entries.len()
    }

    /// Returns true if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.write().entries.clear();
    }
}

#[async_trait]
impl CacheBackend for InMemoryReadCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let mut state = self.write();

        if state.fail_on_get {
            return Err(CacheError::Backend(format!("get {key} failed")));
        }

        match state.entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                state.entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        let mut state = self.write();

        if state.fail_on_set {
            return Err(CacheError::Backend(format!("set {key} failed")));
        }

        let now = Instant::now();
        state.entries.retain(|_, entry| !entry.is_expired(now));

        let expires_at = ttl.map(|ttl| now + ttl);
        state
            .entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut state = self.write();

        if state.fail_on_remove {
            return Err(CacheError::Backend(format!("remove {key} failed")));
        }

        state.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReadCache;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
        total: i64,
    }

    fn entry() -> Entry {
        Entry {
            name: "S-1".to_string(),
            total: 1050,
        }
    }

    #[tokio::test]
    async fn test_typed_set_and_get() {
        let cache = InMemoryReadCache::new();

        cache.set("sale:id:1", &entry(), None).await.unwrap();

        let cached: Option<Entry> = cache.get("sale:id:1").await.unwrap();
        assert_eq!(cached, Some(entry()));
        assert!(cache.contains("sale:id:1"));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let cache = InMemoryReadCache::new();
        let cached: Option<Entry> = cache.get("nope").await.unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = InMemoryReadCache::new();
        cache.set("k", &entry(), None).await.unwrap();

        cache.remove("k").await.unwrap();
        cache.remove("k").await.unwrap();

        assert!(!cache.contains("k"));
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = InMemoryReadCache::new();
        cache
            .set("k", &entry(), Some(Duration::from_secs(300)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        let cached: Option<Entry> = cache.get("k").await.unwrap();
        assert!(cached.is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        let cached: Option<Entry> = cache.get("k").await.unwrap();
        assert!(cached.is_none());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_decode_mismatch_is_a_serialization_error() {
        let cache = InMemoryReadCache::new();
        cache.set("k", &42_u32, None).await.unwrap();

        let result: Result<Option<Entry>> = cache.get("k").await;
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_failure_toggles() {
        let cache = InMemoryReadCache::new();
        cache.set("k", &entry(), None).await.unwrap();

        cache.set_fail_on_get(true);
        let result: Result<Option<Entry>> = cache.get("k").await;
        assert!(result.is_err());

        cache.set_fail_on_set(true);
        assert!(cache.set("k2", &entry(), None).await.is_err());
        assert!(!cache.contains("k2"));

        cache.set_fail_on_remove(true);
        assert!(cache.remove("k").await.is_err());
        assert!(cache.contains("k"));

        cache.set_fail_on_get(false);
        cache.set_fail_on_remove(false);
        cache.remove("k").await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_sweep_expired_entries() {
        let cache = InMemoryReadCache::new();
        let ttl = Some(Duration::from_secs(300));
        cache.set("sale:number:S-1", &entry(), ttl).await.unwrap();
        cache.set("sale:number:S-2", &entry(), ttl).await.unwrap();
        cache.set("pinned", &entry(), None).await.unwrap();
        assert_eq!(cache.stored_len(), 3);

        tokio::time::advance(Duration::from_secs(301)).await;
        cache.set("sale:id:1", &entry(), ttl).await.unwrap();

        assert_eq!(cache.stored_len(), 2);
        assert!(cache.contains("pinned"));
        assert!(cache.contains("sale:id:1"));
    }
}
