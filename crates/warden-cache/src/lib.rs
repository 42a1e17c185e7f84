//! # warden-cache
//!
//! Shared TTL-capable key-value cache for the warden request path.
//!
//! Every component that needs short-lived shared state (hourly hit
//! counters, memoized geolocation lookups) goes through the
//! [`KeyValueCache`] capability trait:
//!
//! - [`KeyValueCache::create_if_absent`] - atomic create with TTL
//! - [`KeyValueCache::increment`] - atomic counter increment
//! - [`KeyValueCache::get`] / [`KeyValueCache::set`] - plain reads/writes
//! - [`KeyValueCache::keys`] - optional glob enumeration
//!
//! [`MemoryCache`] is the in-process backend. Values are
//! [`serde_json::Value`], so any backend that stores JSON (an external
//! cache server, for instance) can implement the same trait without a
//! separate value model.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use warden_cache::{KeyValueCache, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let created = cache
//!     .create_if_absent("hits:1.2.3.4:2024091514", 1.into(), Some(Duration::from_secs(3600)))
//!     .unwrap();
//! assert!(created);
//!
//! let count = cache.increment("hits:1.2.3.4:2024091514").unwrap();
//! assert_eq!(count, 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod memory;

pub use cache::{key_matches, KeyValueCache};
pub use error::{CacheError, CacheResult};
pub use memory::MemoryCache;
