//! Audit record for one intercepted request.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One intercepted request with its resolved geolocation.
///
/// Append-only: records are never updated after creation. The
/// `(ip_address, path, timestamp)` triple identifies the request for
/// duplicate suppression; `id` is a storage identifier only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Client IP the request was attributed to.
    pub ip_address: IpAddr,
    /// Path accessed by the IP.
    pub path: String,
    /// Resolved country.
    pub country: String,
    /// Resolved city.
    pub city: String,
    /// When the request was intercepted.
    pub timestamp: DateTime<Utc>,
}

impl RequestRecord {
    /// Create a record with a fresh identifier.
    #[must_use]
    pub fn new(
        ip_address: IpAddr,
        path: impl Into<String>,
        country: impl Into<String>,
        city: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ip_address,
            path: path.into(),
            country: country.into(),
            city: city.into(),
            timestamp,
        }
    }

    /// Serialize the record to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The fields that identify the underlying request.
    #[must_use]
    pub fn dedup_key(&self) -> (IpAddr, String, DateTime<Utc>) {
        (self.ip_address, self.path.clone(), self.timestamp)
    }
}

impl fmt::Display for RequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} accessed {} at {}",
            self.ip_address, self.path, self.timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RequestRecord {
        RequestRecord::new(
            "1.2.3.4".parse().unwrap(),
            "/login",
            "Ghana",
            "Accra",
            Utc::now(),
        )
    }

    #[test]
    fn test_new_assigns_fresh_ids() {
        let a = record();
        let b = record();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_display() {
        let r = record();
        let text = r.to_string();
        assert!(text.contains("1.2.3.4"));
        assert!(text.contains("/login"));
    }

    #[test]
    fn test_json_round_trip() {
        let r = record();
        let json = r.to_json().unwrap();
        let back: RequestRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_dedup_key_ignores_id_and_geolocation() {
        let ts = Utc::now();
        let ip: IpAddr = "1.2.3.4".parse().unwrap();
        let a = RequestRecord::new(ip, "/login", "Ghana", "Accra", ts);
        let b = RequestRecord::new(ip, "/login", "Unknown Country", "Unknown City", ts);
        assert_eq!(a.dedup_key(), b.dedup_key());
    }
}
