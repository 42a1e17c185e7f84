//! Hourly hit counters for sensitive paths.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use warden_cache::{CacheError, CacheResult, KeyValueCache};

/// Prefix of every hit-counter key.
pub const HIT_KEY_PREFIX: &str = "hits:";

/// Truncate a timestamp to its wall-clock hour bucket (`YYYYMMDDHH`).
#[must_use]
pub fn hour_bucket(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%d%H").to_string()
}

/// One counter per `(ip, calendar-hour)` bucket.
///
/// Keys follow the `hits:<ip>:<YYYYMMDDHH>` format and expire a fixed
/// interval after first write, so a bucket never carries over into the
/// next hour. Counting relies entirely on the cache's atomic
/// create-if-absent and increment primitives; there is no
/// read-modify-write in this path.
#[derive(Clone)]
pub struct HitCounter {
    cache: Arc<dyn KeyValueCache>,
    ttl: Duration,
}

impl HitCounter {
    /// Create a counter over the given cache with the given entry TTL.
    #[must_use]
    pub fn new(cache: Arc<dyn KeyValueCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn key(ip: &IpAddr, hour: &str) -> String {
        format!("{HIT_KEY_PREFIX}{ip}:{hour}")
    }

    /// Record one hit for the IP in the hour bucket of `now`.
    ///
    /// Returns the resulting count for the bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache fails; callers on the request path
    /// treat that as best-effort and keep going.
    pub fn bump(&self, ip: &IpAddr, now: DateTime<Utc>) -> CacheResult<i64> {
        let hour = hour_bucket(now);
        let key = Self::key(ip, &hour);

        if self.cache.create_if_absent(&key, Value::from(1), Some(self.ttl))? {
            return Ok(1);
        }

        match self.cache.increment(&key) {
            Ok(count) => Ok(count),
            Err(CacheError::KeyMissing { .. }) => {
                // The entry expired between the create attempt and the
                // increment; start a fresh bucket.
                debug!(key = %key, "counter expired mid-bump, recreating");
                if self.cache.create_if_absent(&key, Value::from(1), Some(self.ttl))? {
                    Ok(1)
                } else {
                    self.cache.increment(&key)
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Current count for the IP in the hour bucket of `now`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache fails.
    pub fn count(&self, ip: &IpAddr, now: DateTime<Utc>) -> CacheResult<Option<i64>> {
        let key = Self::key(ip, &hour_bucket(now));
        Ok(self.cache.get(&key)?.and_then(|v| v.as_i64()))
    }

    /// Snapshot of all counters in the given hour bucket.
    ///
    /// IPs are parsed out of the key by stripping the `hits:` prefix and
    /// the `:<hour>` suffix, so IPv6 addresses (which contain colons)
    /// survive. No ordering guarantee.
    ///
    /// # Errors
    ///
    /// Propagates [`CacheError::EnumerationUnsupported`] from backends
    /// without the enumeration capability, or any other cache failure.
    pub fn enumerate(&self, hour: &str) -> CacheResult<Vec<(IpAddr, i64)>> {
        let pattern = format!("{HIT_KEY_PREFIX}*:{hour}");
        let keys = self.cache.keys(&pattern)?;
        let suffix = format!(":{hour}");

        let mut counters = Vec::with_capacity(keys.len());
        for key in keys {
            let ip_part = key
                .strip_prefix(HIT_KEY_PREFIX)
                .and_then(|rest| rest.strip_suffix(suffix.as_str()));
            let Some(ip_part) = ip_part else { continue };

            let Ok(ip) = ip_part.parse::<IpAddr>() else {
                debug!(key = %key, "skipping counter key with unparseable IP");
                continue;
            };

            if let Some(count) = self.cache.get(&key)?.and_then(|v| v.as_i64()) {
                counters.push((ip, count));
            }
        }

        Ok(counters)
    }
}
