//! Memoized geolocation lookups.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use warden_cache::{CacheResult, KeyValueCache};

use crate::request::Geolocation;

/// Prefix of every geolocation cache key.
pub const GEO_KEY_PREFIX: &str = "geo:";

/// Per-IP geolocation cache with a fixed TTL.
///
/// A value is written at most once per IP per TTL window; reads never
/// mutate the entry. Resolution itself happens upstream; this cache only
/// memoizes whatever the resolver attached to the request.
#[derive(Clone)]
pub struct GeoCache {
    cache: Arc<dyn KeyValueCache>,
    ttl: Duration,
}

impl GeoCache {
    /// Create a geolocation cache over the given backend.
    #[must_use]
    pub fn new(cache: Arc<dyn KeyValueCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn key(ip: &IpAddr) -> String {
        format!("{GEO_KEY_PREFIX}{ip}")
    }

    /// Read the cached geolocation for an IP, if any.
    ///
    /// A cached value that no longer deserializes is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache backend fails.
    pub fn lookup(&self, ip: &IpAddr) -> CacheResult<Option<Geolocation>> {
        let key = Self::key(ip);
        let Some(value) = self.cache.get(&key)? else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(geolocation) => Ok(Some(geolocation)),
            Err(e) => {
                debug!(key = %key, error = %e, "discarding malformed cached geolocation");
                Ok(None)
            }
        }
    }

    /// Cache the geolocation for an IP with the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the cache backend fails.
    pub fn store(&self, ip: &IpAddr, geolocation: &Geolocation) -> CacheResult<()> {
        let value = serde_json::to_value(geolocation)?;
        self.cache.set(&Self::key(ip), value, Some(self.ttl))
    }
}
