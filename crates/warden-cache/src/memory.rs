//! In-process cache backend with TTL expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::cache::{key_matches, KeyValueCache};
use crate::error::{CacheError, CacheResult};

/// A cache entry with its expiry deadline.
#[derive(Debug)]
struct Entry {
    /// Stored value.
    value: Value,
    /// When the entry expires (None = no expiry).
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|t| Instant::now() + t),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// In-process [`KeyValueCache`] backend.
///
/// All primitives take the write lock for the whole check-and-act, which
/// is what makes create-if-absent and increment atomic under concurrent
/// callers. Expired entries are treated as absent on read and purged
/// opportunistically on a cleanup interval.
#[derive(Debug)]
pub struct MemoryCache {
    /// Live entries.
    entries: RwLock<HashMap<String, Entry>>,
    /// Last cleanup time.
    last_cleanup: RwLock<Instant>,
    /// Cleanup interval.
    cleanup_interval: Duration,
}

impl MemoryCache {
    /// Create an empty cache with the default cleanup interval.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cleanup_interval(Duration::from_secs(60))
    }

    /// Create an empty cache with a custom cleanup interval.
    #[must_use]
    pub fn with_cleanup_interval(cleanup_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            last_cleanup: RwLock::new(Instant::now()),
            cleanup_interval,
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|e| !e.is_expired())
            .count()
    }

    /// Whether the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Manually purge expired entries. Returns the number removed.
    pub fn cleanup(&self) -> usize {
        let mut entries = self.entries.write();
        let initial = entries.len();

        entries.retain(|key, entry| {
            let keep = !entry.is_expired();
            if !keep {
                debug!(key = %key, "cache entry expired, removing");
            }
            keep
        });

        let removed = initial.saturating_sub(entries.len());
        *self.last_cleanup.write() = Instant::now();
        removed
    }

    /// Purge expired entries if the cleanup interval has elapsed.
    fn maybe_cleanup(&self) {
        let due = {
            let last = *self.last_cleanup.read();
            last.elapsed() >= self.cleanup_interval
        };

        if due {
            self.cleanup();
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueCache for MemoryCache {
    fn create_if_absent(&self, key: &str, value: Value, ttl: Option<Duration>) -> CacheResult<bool> {
        self.maybe_cleanup();

        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(existing) if !existing.is_expired() => Ok(false),
            _ => {
                entries.insert(key.to_string(), Entry::new(value, ttl));
                Ok(true)
            }
        }
    }

    fn increment(&self, key: &str) -> CacheResult<i64> {
        let mut entries = self.entries.write();

        let entry = match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => entry,
            _ => return Err(CacheError::KeyMissing { key: key.into() }),
        };

        let current = entry.value.as_i64().ok_or_else(|| CacheError::NotAnInteger {
            key: key.into(),
        })?;
        let next = current.saturating_add(1);
        entry.value = Value::from(next);
        Ok(next)
    }

    fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> CacheResult<()> {
        self.maybe_cleanup();
        self.entries
            .write()
            .insert(key.to_string(), Entry::new(value, ttl));
        Ok(())
    }

    fn remove(&self, key: &str) -> CacheResult<bool> {
        let removed = match self.entries.write().remove(key) {
            Some(entry) => !entry.is_expired(),
            None => false,
        };
        Ok(removed)
    }

    fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && key_matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_cache_is_empty() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let cache = MemoryCache::new();

        cache.set("k", Value::from("v"), None).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(Value::from("v")));
        assert_eq!(cache.get("missing").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let cache = MemoryCache::new();

        cache.set("k", Value::from(1), None).unwrap();
        cache.set("k", Value::from(2), None).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(Value::from(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_create_if_absent_first_wins() {
        let cache = MemoryCache::new();

        assert!(cache.create_if_absent("k", Value::from(1), None).unwrap());
        assert!(!cache.create_if_absent("k", Value::from(99), None).unwrap());
        assert_eq!(cache.get("k").unwrap(), Some(Value::from(1)));
    }

    #[test]
    fn test_create_if_absent_replaces_expired_entry() {
        let cache = MemoryCache::new();

        cache
            .set("k", Value::from(5), Some(Duration::from_millis(10)))
            .unwrap();
        thread::sleep(Duration::from_millis(20));

        assert!(cache.create_if_absent("k", Value::from(1), None).unwrap());
        assert_eq!(cache.get("k").unwrap(), Some(Value::from(1)));
    }

    #[test]
    fn test_increment() {
        let cache = MemoryCache::new();

        cache.create_if_absent("k", Value::from(1), None).unwrap();
        assert_eq!(cache.increment("k").unwrap(), 2);
        assert_eq!(cache.increment("k").unwrap(), 3);
        assert_eq!(cache.get("k").unwrap(), Some(Value::from(3)));
    }

    #[test]
    fn test_increment_missing_key() {
        let cache = MemoryCache::new();

        let result = cache.increment("missing");
        assert!(matches!(result, Err(CacheError::KeyMissing { .. })));
    }

    #[test]
    fn test_increment_expired_key() {
        let cache = MemoryCache::new();

        cache
            .set("k", Value::from(1), Some(Duration::from_millis(10)))
            .unwrap();
        thread::sleep(Duration::from_millis(20));

        let result = cache.increment("k");
        assert!(matches!(result, Err(CacheError::KeyMissing { .. })));
    }

    #[test]
    fn test_increment_non_integer() {
        let cache = MemoryCache::new();

        cache.set("k", Value::from("text"), None).unwrap();
        let result = cache.increment("k");
        assert!(matches!(result, Err(CacheError::NotAnInteger { .. })));
    }

    #[test]
    fn test_ttl_expiry_hides_entry() {
        let cache = MemoryCache::new();

        cache
            .set("k", Value::from(1), Some(Duration::from_millis(10)))
            .unwrap();
        assert!(cache.get("k").unwrap().is_some());

        thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("k").unwrap(), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_remove() {
        let cache = MemoryCache::new();

        cache.set("k", Value::from(1), None).unwrap();
        assert!(cache.remove("k").unwrap());
        assert!(!cache.remove("k").unwrap());
        assert_eq!(cache.get("k").unwrap(), None);
    }

    #[test]
    fn test_remove_expired_entry_reports_false() {
        let cache = MemoryCache::new();

        cache
            .set("k", Value::from(1), Some(Duration::from_millis(10)))
            .unwrap();
        thread::sleep(Duration::from_millis(20));
        assert!(!cache.remove("k").unwrap());
    }

    #[test]
    fn test_keys_glob() {
        let cache = MemoryCache::new();

        cache.set("hits:1.2.3.4:2024091514", Value::from(3), None).unwrap();
        cache.set("hits:5.6.7.8:2024091514", Value::from(7), None).unwrap();
        cache.set("hits:1.2.3.4:2024091515", Value::from(1), None).unwrap();
        cache.set("geo:1.2.3.4", Value::from("x"), None).unwrap();

        let mut keys = cache.keys("hits:*:2024091514").unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "hits:1.2.3.4:2024091514".to_string(),
                "hits:5.6.7.8:2024091514".to_string(),
            ]
        );
    }

    #[test]
    fn test_keys_skips_expired() {
        let cache = MemoryCache::new();

        cache
            .set("hits:1.2.3.4:2024091514", Value::from(3), Some(Duration::from_millis(10)))
            .unwrap();
        cache.set("hits:5.6.7.8:2024091514", Value::from(7), None).unwrap();
        thread::sleep(Duration::from_millis(20));

        let keys = cache.keys("hits:*:2024091514").unwrap();
        assert_eq!(keys, vec!["hits:5.6.7.8:2024091514".to_string()]);
    }

    #[test]
    fn test_cleanup_removes_expired() {
        let cache = MemoryCache::new();

        cache
            .set("a", Value::from(1), Some(Duration::from_millis(10)))
            .unwrap();
        cache.set("b", Value::from(2), None).unwrap();
        thread::sleep(Duration::from_millis(20));

        let removed = cache.cleanup();
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let cache = MemoryCache::new();

        cache.set("a", Value::from(1), None).unwrap();
        cache.set("b", Value::from(2), None).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_create_and_increment_converges() {
        let cache = Arc::new(MemoryCache::new());
        let threads = 16;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let created = cache
                        .create_if_absent("k", Value::from(1), Some(Duration::from_secs(3600)))
                        .unwrap();
                    if !created {
                        cache.increment("k").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.get("k").unwrap(), Some(Value::from(i64::from(threads))));
    }

    #[test]
    fn test_default() {
        let cache = MemoryCache::default();
        assert!(cache.is_empty());
    }
}
