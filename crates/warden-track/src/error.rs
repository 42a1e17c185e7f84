//! Error types for the durable store contracts.

use thiserror::Error;

/// Errors that can occur in blocklist and suspicious-IP stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed (file-backed stores).
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored state could not be serialized or deserialized.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend failed.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
