//! Error types for audit logging.

use std::net::IpAddr;

use thiserror::Error;

/// Errors that can occur when appending audit records.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A record for the same request was already stored.
    #[error("duplicate audit record for {ip} at {path}")]
    Duplicate {
        /// The recorded IP address.
        ip: IpAddr,
        /// The recorded request path.
        path: String,
    },

    /// The queued writer is no longer accepting records.
    #[error("audit writer has shut down")]
    Closed,

    /// The backend failed.
    #[error("audit backend error: {0}")]
    Backend(String),
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_duplicate() {
        let err = AuditError::Duplicate {
            ip: "1.2.3.4".parse().unwrap(),
            path: "/login".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1.2.3.4"));
        assert!(msg.contains("/login"));
    }

    #[test]
    fn test_error_display_closed() {
        let err = AuditError::Closed;
        assert!(err.to_string().contains("shut down"));
    }

    #[test]
    fn test_error_display_backend() {
        let err = AuditError::Backend("table locked".into());
        assert!(err.to_string().contains("table locked"));
    }
}
