//! Cache error types.

use thiserror::Error;

/// Errors that can occur when talking to a read cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend rejected or failed the operation.
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// A Redis error occurred.
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
