//! Periodic anomaly-detection sweep over hit counters.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use warden_cache::{CacheError, KeyValueCache};

use crate::config::TrackConfig;
use crate::hits::{hour_bucket, HitCounter};
use crate::store::SuspiciousIpStore;

/// Flags IPs whose hourly hit count exceeded the threshold.
///
/// Driven by an external scheduler; each run is a single pass over the
/// previous, already-closed hour bucket, so it never races the counters
/// still being incremented for the current hour. Reasons are stamped
/// with the exact count, which makes a re-run over an unchanged counter
/// a no-op.
pub struct AnomalyDetector {
    hits: HitCounter,
    store: Arc<dyn SuspiciousIpStore>,
    threshold: i64,
}

impl AnomalyDetector {
    /// Create a detector over the shared cache and suspicious-IP store.
    #[must_use]
    pub fn new(
        cache: Arc<dyn KeyValueCache>,
        store: Arc<dyn SuspiciousIpStore>,
        config: &TrackConfig,
    ) -> Self {
        Self {
            hits: HitCounter::new(cache, config.hit_ttl),
            store,
            threshold: config.hit_threshold,
        }
    }

    /// Create a detector with an explicit threshold and counter TTL.
    #[must_use]
    pub fn with_threshold(
        cache: Arc<dyn KeyValueCache>,
        store: Arc<dyn SuspiciousIpStore>,
        threshold: i64,
        hit_ttl: Duration,
    ) -> Self {
        Self {
            hits: HitCounter::new(cache, hit_ttl),
            store,
            threshold,
        }
    }

    /// Sweep the previous hour's counters. Returns the number of IPs
    /// newly flagged.
    ///
    /// Never fails: a backend without enumeration support degrades the
    /// run to a no-op, and any other cache or store failure is logged
    /// and skipped.
    pub fn run(&self, now: DateTime<Utc>) -> usize {
        let prev_hour = hour_bucket(now - chrono::Duration::hours(1));

        let counters = match self.hits.enumerate(&prev_hour) {
            Ok(counters) => counters,
            Err(CacheError::EnumerationUnsupported) => {
                debug!(hour = %prev_hour, "cache backend cannot enumerate keys, skipping sweep");
                return 0;
            }
            Err(e) => {
                warn!(hour = %prev_hour, error = %e, "failed to enumerate hit counters");
                return 0;
            }
        };

        let mut flagged = 0;
        for (ip, count) in counters {
            if count <= self.threshold {
                continue;
            }

            let reason = format!("Exceeded {count} requests in hour {prev_hour}");
            match self.store.insert_if_absent(ip, &reason, now) {
                Ok(true) => {
                    info!(ip = %ip, count = count, hour = %prev_hour, "flagged suspicious IP");
                    flagged += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(ip = %ip, error = %e, "failed to record suspicious IP");
                }
            }
        }

        flagged
    }

    /// The threshold above which an IP is flagged.
    #[must_use]
    pub const fn threshold(&self) -> i64 {
        self.threshold
    }
}
