//! Cache contracts.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;

/// Key/value storage for serialized entries with an optional expiry.
///
/// Entries are derived data: a backend may drop them at any time and callers
/// must fall back to the source of truth. All implementations must be
/// thread-safe.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the raw value for `key`, or `None` if absent or expired.
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// With `ttl = None` the entry never expires on its own.
    async fn set_raw(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Typed access on top of a [`CacheBackend`], using JSON as the wire format.
#[async_trait]
pub trait ReadCache: CacheBackend {
    /// Reads and decodes the entry for `key`.
    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_raw(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encodes `value` and stores it under `key`.
    async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, raw, ttl).await
    }
}

// Blanket implementation for all CacheBackend implementations
impl<C: CacheBackend + ?Sized> ReadCache for C {}
