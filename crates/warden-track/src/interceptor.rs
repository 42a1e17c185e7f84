//! The per-request interception pipeline.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use warden_audit::{AuditError, AuditLog, RequestRecord};
use warden_cache::KeyValueCache;

use crate::config::TrackConfig;
use crate::geo::GeoCache;
use crate::hits::HitCounter;
use crate::request::{HttpResponse, InboundRequest};
use crate::store::BlocklistStore;

/// Per-request pipeline: blocklist enforcement, sensitive-path hit
/// counting, geolocation memoization, audit logging.
///
/// All collaborators are injected at construction; nothing here is
/// process-global. Side effects run in a fixed order for every request:
/// blocklist short-circuits before any counting or geolocation work,
/// counting happens before the geolocation step, and the audit write
/// happens only after the downstream response exists.
///
/// Every failure on this path recovers locally: cache and store errors
/// are logged and the request proceeds without the affected side effect.
pub struct RequestInterceptor {
    config: TrackConfig,
    blocklist: Arc<dyn BlocklistStore>,
    hits: HitCounter,
    geo: GeoCache,
    audit: Arc<dyn AuditLog>,
}

impl RequestInterceptor {
    /// Create an interceptor over the shared cache and stores.
    #[must_use]
    pub fn new(
        config: TrackConfig,
        cache: Arc<dyn KeyValueCache>,
        blocklist: Arc<dyn BlocklistStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let hits = HitCounter::new(Arc::clone(&cache), config.hit_ttl);
        let geo = GeoCache::new(cache, config.geo_ttl);

        Self {
            config,
            blocklist,
            hits,
            geo,
            audit,
        }
    }

    /// Run one request through the pipeline.
    ///
    /// Returns the downstream handler's response unchanged, or the fixed
    /// 403 rejection for blocked IPs. Requests with no extractable
    /// client IP pass straight through with no side effects.
    pub fn intercept<F>(&self, request: &mut InboundRequest, next: F) -> HttpResponse
    where
        F: FnOnce(&InboundRequest) -> HttpResponse,
    {
        let Some(ip) = request.client_ip() else {
            warn!(path = %request.path, "no client IP on request, skipping tracking");
            return next(request);
        };

        // Blocked traffic is rejected before any accounting.
        match self.blocklist.contains(&ip) {
            Ok(true) => {
                error!(ip = %ip, path = %request.path, "blocked IP attempted access");
                return HttpResponse::forbidden();
            }
            Ok(false) => {}
            Err(e) => {
                warn!(ip = %ip, error = %e, "blocklist lookup failed, failing open");
            }
        }

        if self.config.is_sensitive(&request.path) {
            if let Err(e) = self.hits.bump(&ip, Utc::now()) {
                warn!(ip = %ip, path = %request.path, error = %e, "failed to count sensitive-path hit");
            }
        }

        // Exactly one of: populate the context from the cache, or seed
        // the cache from the context.
        match self.geo.lookup(&ip) {
            Ok(Some(cached)) => request.geolocation = Some(cached),
            Ok(None) => {
                if let Some(geolocation) = &request.geolocation {
                    if let Err(e) = self.geo.store(&ip, geolocation) {
                        warn!(ip = %ip, error = %e, "failed to cache geolocation");
                    }
                }
            }
            Err(e) => {
                warn!(ip = %ip, error = %e, "geolocation cache lookup failed");
            }
        }

        let response = next(request);

        if let Some(geolocation) = &request.geolocation {
            let country = geolocation.country_or_unknown();
            let city = geolocation.city_or_unknown();
            info!(
                ip = %ip,
                path = %request.path,
                country = %country,
                city = %city,
                "request tracked"
            );

            let record = RequestRecord::new(ip, request.path.clone(), country, city, Utc::now());
            match self.audit.append(record) {
                Ok(()) | Err(AuditError::Duplicate { .. }) => {}
                Err(e) => {
                    warn!(ip = %ip, error = %e, "failed to append audit record");
                }
            }
        }

        response
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &TrackConfig {
        &self.config
    }
}
