//! # warden-track
//!
//! IP tracking layer for inbound HTTP traffic.
//!
//! Every request runs through the [`RequestInterceptor`] pipeline:
//!
//! 1. Client IP extraction (forwarded-for header, then peer address)
//! 2. [`BlocklistStore`] enforcement - blocked IPs get a fixed 403
//! 3. [`HitCounter`] accounting for sensitive paths, bucketed by
//!    wall-clock hour
//! 4. [`GeoCache`] memoization of upstream geolocation results
//! 5. Downstream handler invocation
//! 6. Audit record emission
//!
//! Independently, the [`AnomalyDetector`] sweeps the previous hour's
//! counters on an external schedule and flags IPs over the configured
//! threshold into a [`SuspiciousIpStore`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use warden_audit::MemoryAuditLog;
//! use warden_cache::MemoryCache;
//! use warden_track::{
//!     HttpResponse, InboundRequest, MemoryBlocklist, RequestInterceptor, TrackConfig,
//! };
//!
//! let interceptor = RequestInterceptor::new(
//!     TrackConfig::default(),
//!     Arc::new(MemoryCache::new()),
//!     Arc::new(MemoryBlocklist::new()),
//!     Arc::new(MemoryAuditLog::new()),
//! );
//!
//! let mut request = InboundRequest::new("/login")
//!     .with_peer_addr("203.0.113.7".parse().unwrap());
//! let response = interceptor.intercept(&mut request, |_| HttpResponse::ok("OK"));
//! assert_eq!(response.status, 200);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod geo;
pub mod hits;
pub mod interceptor;
pub mod request;
pub mod store;
pub mod sweep;

pub use config::{TrackConfig, TrackConfigBuilder};
pub use error::{StoreError, StoreResult};
pub use geo::{GeoCache, GEO_KEY_PREFIX};
pub use hits::{hour_bucket, HitCounter, HIT_KEY_PREFIX};
pub use interceptor::RequestInterceptor;
pub use request::{Geolocation, HttpResponse, InboundRequest, UNKNOWN_CITY, UNKNOWN_COUNTRY};
pub use store::{
    BlocklistStore, JsonFileBlocklist, MemoryBlocklist, MemorySuspiciousIpStore, SuspiciousIp,
    SuspiciousIpStore,
};
pub use sweep::AnomalyDetector;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::TrackConfig;
    pub use crate::geo::GeoCache;
    pub use crate::hits::HitCounter;
    pub use crate::interceptor::RequestInterceptor;
    pub use crate::request::{Geolocation, HttpResponse, InboundRequest};
    pub use crate::store::{BlocklistStore, MemoryBlocklist, SuspiciousIpStore};
    pub use crate::sweep::AnomalyDetector;
}
