//! The cache capability trait.

use std::time::Duration;

use serde_json::Value;

use crate::error::{CacheError, CacheResult};

/// Capability contract for a shared TTL key-value cache.
///
/// Implementations must make [`create_if_absent`](Self::create_if_absent)
/// and [`increment`](Self::increment) atomic with respect to concurrent
/// callers for the same key: two simultaneous first-touches of one key
/// must resolve to one create and one increment, never two creates.
///
/// Key enumeration is an optional capability; backends without it keep
/// the default [`keys`](Self::keys) implementation, which reports
/// [`CacheError::EnumerationUnsupported`].
pub trait KeyValueCache: Send + Sync {
    /// Atomically creates the key with the given value and TTL.
    ///
    /// Returns `true` if the key was created, `false` if a live entry
    /// already existed. Expired entries count as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn create_if_absent(&self, key: &str, value: Value, ttl: Option<Duration>) -> CacheResult<bool>;

    /// Atomically increments the integer counter under the key.
    ///
    /// Returns the new value. The entry's TTL is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::KeyMissing`] if the key is absent or
    /// expired, and [`CacheError::NotAnInteger`] if the stored value is
    /// not an integer.
    fn increment(&self, key: &str) -> CacheResult<i64>;

    /// Reads the value under the key, if a live entry exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get(&self, key: &str) -> CacheResult<Option<Value>>;

    /// Unconditionally writes the value under the key with the given TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> CacheResult<()>;

    /// Removes the key. Returns `true` if a live entry was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn remove(&self, key: &str) -> CacheResult<bool>;

    /// Lists live keys matching a glob pattern with a single `*`.
    ///
    /// Optional capability. The result is a point-in-time snapshot with
    /// no ordering guarantee.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::EnumerationUnsupported`] unless the backend
    /// overrides this method.
    fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let _ = pattern;
        Err(CacheError::EnumerationUnsupported)
    }
}

/// Glob matching with a single `*` wildcard.
///
/// `hits:*:2024091514` matches any key with that prefix and suffix;
/// a pattern without `*` matches only the exact key.
#[must_use]
pub fn key_matches(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            key.len() >= prefix.len() + suffix.len()
                && key.starts_with(prefix)
                && key.ends_with(suffix)
        }
        None => pattern == key,
    }
}
