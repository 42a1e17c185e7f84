//! Error types for cache operations.

use thiserror::Error;

/// Errors that can occur in cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The key does not exist (or its entry has expired).
    #[error("key not found: {key}")]
    KeyMissing {
        /// The missing key.
        key: String,
    },

    /// The value under the key is not an integer counter.
    #[error("value under {key} is not an integer")]
    NotAnInteger {
        /// The offending key.
        key: String,
    },

    /// The backend does not support key enumeration.
    #[error("key enumeration is not supported by this cache backend")]
    EnumerationUnsupported,

    /// A value could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend failed.
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
