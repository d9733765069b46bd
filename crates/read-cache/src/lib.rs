//! Read cache for derived sale views.
//!
//! - [`CacheBackend`] stores raw serialized values with an optional expiry
//! - [`ReadCache`] adds typed `get`/`set` on top of any backend
//! - [`InMemoryReadCache`] backs tests and single-process deployments
//! - `RedisReadCache` (feature `redis`) shares entries across instances

pub mod backend;
pub mod error;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_cache;

pub use backend::{CacheBackend, ReadCache};
pub use error::{CacheError, Result};
pub use memory::InMemoryReadCache;
#[cfg(feature = "redis")]
pub use redis_cache::RedisReadCache;
