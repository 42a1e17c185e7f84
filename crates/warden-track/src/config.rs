//! Tracking configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the request-tracking layer.
///
/// The hit threshold and sensitive-path prefixes are configuration
/// inputs; the defaults below mirror the documented behavior (100
/// requests per hour, `/admin` and `/login`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Path prefixes that count toward the hourly hit counters.
    pub sensitive_paths: Vec<String>,
    /// TTL for hit-counter entries.
    pub hit_ttl: Duration,
    /// TTL for cached geolocation entries.
    pub geo_ttl: Duration,
    /// Hourly request count above which an IP is flagged (strictly
    /// greater-than).
    pub hit_threshold: i64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            sensitive_paths: vec!["/admin".to_string(), "/login".to_string()],
            hit_ttl: Duration::from_secs(3600),
            geo_ttl: Duration::from_secs(24 * 60 * 60),
            hit_threshold: 100,
        }
    }
}

impl TrackConfig {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> TrackConfigBuilder {
        TrackConfigBuilder::default()
    }

    /// Whether a request path falls under a sensitive prefix.
    #[must_use]
    pub fn is_sensitive(&self, path: &str) -> bool {
        self.sensitive_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Builder for [`TrackConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrackConfigBuilder {
    config: TrackConfig,
}

impl TrackConfigBuilder {
    /// Replace the sensitive-path prefixes.
    #[must_use]
    pub fn sensitive_paths(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.sensitive_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Add one sensitive-path prefix.
    #[must_use]
    pub fn sensitive_path(mut self, prefix: impl Into<String>) -> Self {
        self.config.sensitive_paths.push(prefix.into());
        self
    }

    /// Set the hit-counter TTL.
    #[must_use]
    pub fn hit_ttl(mut self, ttl: Duration) -> Self {
        self.config.hit_ttl = ttl;
        self
    }

    /// Set the geolocation cache TTL.
    #[must_use]
    pub fn geo_ttl(mut self, ttl: Duration) -> Self {
        self.config.geo_ttl = ttl;
        self
    }

    /// Set the hourly hit threshold.
    #[must_use]
    pub fn hit_threshold(mut self, threshold: i64) -> Self {
        self.config.hit_threshold = threshold;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> TrackConfig {
        self.config
    }
}
