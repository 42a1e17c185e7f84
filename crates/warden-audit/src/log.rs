//! Audit log backends.

use std::collections::HashSet;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::{AuditError, AuditResult};
use crate::record::RequestRecord;

/// Contract for an audit log backend.
///
/// Implementations must fail a repeated append of the same request with
/// [`AuditError::Duplicate`] rather than storing a second row; callers
/// treat that failure as successful suppression, not an error.
pub trait AuditLog: Send + Sync {
    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Duplicate`] if a record with the same
    /// `(ip_address, path, timestamp)` triple was already stored, or a
    /// backend error.
    fn append(&self, record: RequestRecord) -> AuditResult<()>;
}

#[derive(Debug, Default)]
struct MemoryAuditLogInner {
    records: Vec<RequestRecord>,
    seen: HashSet<(IpAddr, String, DateTime<Utc>)>,
}

/// In-process audit log with duplicate suppression.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    inner: RwLock<MemoryAuditLogInner>,
}

impl MemoryAuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Whether the log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all stored records, in append order.
    #[must_use]
    pub fn records(&self) -> Vec<RequestRecord> {
        self.inner.read().records.clone()
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, record: RequestRecord) -> AuditResult<()> {
        let mut inner = self.inner.write();

        if !inner.seen.insert(record.dedup_key()) {
            return Err(AuditError::Duplicate {
                ip: record.ip_address,
                path: record.path,
            });
        }

        inner.records.push(record);
        Ok(())
    }
}

/// A no-op audit log for disabled scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditLog;

impl NoopAuditLog {
    /// Create a no-op log.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditLog for NoopAuditLog {
    fn append(&self, _record: RequestRecord) -> AuditResult<()> {
        Ok(())
    }
}
