//! Cache error types

use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    /// Failed to reach the cache backend
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// Failed to serialize or deserialize a cached value
    #[error("Cache serialization error: {0}")]
    SerializationError(String),

    /// Cache operation timed out
    #[error("Cache operation timed out: {0}")]
    Timeout(String),

    /// Generic backend error
    #[error("Cache backend error: {0}")]
    BackendError(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::SerializationError(error.to_string())
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
