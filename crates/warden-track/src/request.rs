//! Request and response model at the interception boundary.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Country/city default used when a resolver left a field empty.
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";
/// City default counterpart of [`UNKNOWN_COUNTRY`].
pub const UNKNOWN_CITY: &str = "Unknown City";

/// A geolocation result for one IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geolocation {
    /// Country name, if resolved.
    pub country: Option<String>,
    /// City name, if resolved.
    pub city: Option<String>,
}

impl Geolocation {
    /// Create a geolocation with both fields resolved.
    #[must_use]
    pub fn new(country: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            city: Some(city.into()),
        }
    }

    /// Country name, defaulting to [`UNKNOWN_COUNTRY`].
    #[must_use]
    pub fn country_or_unknown(&self) -> &str {
        self.country.as_deref().unwrap_or(UNKNOWN_COUNTRY)
    }

    /// City name, defaulting to [`UNKNOWN_CITY`].
    #[must_use]
    pub fn city_or_unknown(&self) -> &str {
        self.city.as_deref().unwrap_or(UNKNOWN_CITY)
    }
}

/// An inbound request as seen by the interceptor.
///
/// `geolocation` has defined ownership: an upstream resolver may set it
/// once before interception; the interceptor may overwrite it from the
/// cache; no other component writes it.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    /// Raw forwarded-for header value, if present.
    pub forwarded_for: Option<String>,
    /// Transport-level peer address, if known.
    pub peer_addr: Option<IpAddr>,
    /// Request path.
    pub path: String,
    /// Geolocation context attached to the request.
    pub geolocation: Option<Geolocation>,
}

impl InboundRequest {
    /// Create a request for the given path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Attach a forwarded-for header value.
    #[must_use]
    pub fn with_forwarded_for(mut self, header: impl Into<String>) -> Self {
        self.forwarded_for = Some(header.into());
        self
    }

    /// Attach the transport peer address.
    #[must_use]
    pub fn with_peer_addr(mut self, addr: IpAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    /// Attach an upstream-resolved geolocation.
    #[must_use]
    pub fn with_geolocation(mut self, geolocation: Geolocation) -> Self {
        self.geolocation = Some(geolocation);
        self
    }

    /// The client IP this request is attributed to.
    ///
    /// Prefers the first entry of the forwarded-for header (comma
    /// separated, whitespace trimmed) when it parses as an IP literal,
    /// falling back to the transport peer address.
    #[must_use]
    pub fn client_ip(&self) -> Option<IpAddr> {
        if let Some(header) = &self.forwarded_for {
            let first = header.split(',').next().unwrap_or_default().trim();
            if let Ok(ip) = first.parse() {
                return Some(ip);
            }
        }
        self.peer_addr
    }
}

/// A minimal HTTP response at the interception boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// A 200 response with the given body.
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// The fixed 403 rejection returned for blocked IPs.
    #[must_use]
    pub fn forbidden() -> Self {
        Self {
            status: 403,
            body: "403 Forbidden".to_string(),
        }
    }

    /// Whether this is the 403 rejection.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.status == 403
    }
}
