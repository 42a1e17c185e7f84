//! Durable store contracts and reference backends.

use std::collections::HashSet;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreResult;

/// Contract for the durable set of blocked IPs.
///
/// Lookup sits on the per-request hot path and is expected to be O(1)
/// or indexed in any real backend.
pub trait BlocklistStore: Send + Sync {
    /// Add an IP. Returns `false` if it was already blocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert(&self, ip: IpAddr) -> StoreResult<bool>;

    /// Membership test.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn contains(&self, ip: &IpAddr) -> StoreResult<bool>;

    /// Remove an IP. Returns `false` if it was not blocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn remove(&self, ip: &IpAddr) -> StoreResult<bool>;

    /// All currently blocked IPs, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list(&self) -> StoreResult<Vec<IpAddr>>;
}

/// An IP flagged by the anomaly sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousIp {
    /// The flagged IP address.
    pub ip_address: IpAddr,
    /// Why it was flagged.
    pub reason: String,
    /// When it was flagged.
    pub flagged_at: DateTime<Utc>,
}

/// Contract for the append-only store of flagged IPs.
///
/// Rows are unique per `(ip_address, reason)` pair and never deleted by
/// the system.
pub trait SuspiciousIpStore: Send + Sync {
    /// Insert a flag unless the exact `(ip, reason)` pair already
    /// exists. Returns `true` if a row was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert_if_absent(&self, ip: IpAddr, reason: &str, flagged_at: DateTime<Utc>)
        -> StoreResult<bool>;

    /// All flags raised so far, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list(&self) -> StoreResult<Vec<SuspiciousIp>>;
}

/// In-process blocklist backend.
#[derive(Debug, Default)]
pub struct MemoryBlocklist {
    blocked: RwLock<HashSet<IpAddr>>,
}

impl MemoryBlocklist {
    /// Create an empty blocklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlocklistStore for MemoryBlocklist {
    fn insert(&self, ip: IpAddr) -> StoreResult<bool> {
        let inserted = self.blocked.write().insert(ip);
        if inserted {
            info!(ip = %ip, "IP blocked");
        }
        Ok(inserted)
    }

    fn contains(&self, ip: &IpAddr) -> StoreResult<bool> {
        Ok(self.blocked.read().contains(ip))
    }

    fn remove(&self, ip: &IpAddr) -> StoreResult<bool> {
        let removed = self.blocked.write().remove(ip);
        if removed {
            info!(ip = %ip, "IP unblocked");
        }
        Ok(removed)
    }

    fn list(&self) -> StoreResult<Vec<IpAddr>> {
        Ok(self.blocked.read().iter().copied().collect())
    }
}

/// Blocklist backed by a JSON snapshot file.
///
/// The full set is rewritten after every mutation (write to a sibling
/// temp file, then rename), so readers never observe a torn file. Shared
/// by the server wiring and the administrative CLI.
#[derive(Debug)]
pub struct JsonFileBlocklist {
    path: PathBuf,
    blocked: RwLock<HashSet<IpAddr>>,
}

impl JsonFileBlocklist {
    /// Open a blocklist file, loading existing state if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let blocked = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            HashSet::new()
        };
        debug!(path = %path.display(), count = blocked.len(), "loaded blocklist");

        Ok(Self {
            path,
            blocked: RwLock::new(blocked),
        })
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn snapshot(&self, blocked: &HashSet<IpAddr>) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(blocked)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl BlocklistStore for JsonFileBlocklist {
    fn insert(&self, ip: IpAddr) -> StoreResult<bool> {
        let mut blocked = self.blocked.write();
        if !blocked.insert(ip) {
            return Ok(false);
        }
        self.snapshot(&blocked)?;
        info!(ip = %ip, path = %self.path.display(), "IP blocked");
        Ok(true)
    }

    fn contains(&self, ip: &IpAddr) -> StoreResult<bool> {
        Ok(self.blocked.read().contains(ip))
    }

    fn remove(&self, ip: &IpAddr) -> StoreResult<bool> {
        let mut blocked = self.blocked.write();
        if !blocked.remove(ip) {
            return Ok(false);
        }
        self.snapshot(&blocked)?;
        info!(ip = %ip, path = %self.path.display(), "IP unblocked");
        Ok(true)
    }

    fn list(&self) -> StoreResult<Vec<IpAddr>> {
        Ok(self.blocked.read().iter().copied().collect())
    }
}

/// In-process suspicious-IP backend.
#[derive(Debug, Default)]
pub struct MemorySuspiciousIpStore {
    flags: RwLock<Vec<SuspiciousIp>>,
}

impl MemorySuspiciousIpStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of flags raised.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.read().len()
    }

    /// Whether no flags have been raised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SuspiciousIpStore for MemorySuspiciousIpStore {
    fn insert_if_absent(
        &self,
        ip: IpAddr,
        reason: &str,
        flagged_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut flags = self.flags.write();

        let exists = flags
            .iter()
            .any(|flag| flag.ip_address == ip && flag.reason == reason);
        if exists {
            return Ok(false);
        }

        flags.push(SuspiciousIp {
            ip_address: ip,
            reason: reason.to_string(),
            flagged_at,
        });
        Ok(true)
    }

    fn list(&self) -> StoreResult<Vec<SuspiciousIp>> {
        Ok(self.flags.read().clone())
    }
}
