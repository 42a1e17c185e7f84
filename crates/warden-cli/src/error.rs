//! CLI error types.

use thiserror::Error;

use warden_track::StoreError;

/// Errors surfaced to the CLI caller.
#[derive(Debug, Error)]
pub enum CliError {
    /// The blocklist store failed.
    #[error("blocklist error: {0}")]
    Store(#[from] StoreError),

    /// Writing command output failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}
