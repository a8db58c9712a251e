//! In-memory TTL cache
//!
//! Memoizes market-list queries for a bounded duration. Eviction is lazy:
//! an expired entry is only removed when `get` touches it, so `len` counts
//! expired-but-unread entries too. There is no capacity bound.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Default entry lifetime (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A stored value and the instant it stops being served
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Key/value store with per-entry expiry
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Create an empty cache with the given default TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
        }
    }

    /// Default TTL applied by [`TtlCache::set`]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a live value, evicting the entry if it has expired
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value with the default TTL, replacing any prior entry
    pub fn set(&mut self, key: K, value: V) {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, value, ttl);
    }

    /// Store a value with an explicit TTL, replacing any prior entry
    pub fn set_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Alias of [`TtlCache::len`]
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V: Clone> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_before_expiry() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set("markets", vec![1, 2, 3]);

        assert_eq!(cache.get(&"markets"), Some(vec![1, 2, 3]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing_key() {
        let mut cache: TtlCache<String, u32> = TtlCache::default();
        assert_eq!(cache.get(&"nope".to_string()), None);
        assert!(cache.is_empty());
        assert_eq!(cache.default_ttl(), DEFAULT_TTL);
    }

    #[test]
    fn test_expired_entry_is_absent_and_evicted() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set_with_ttl("k", 7, Duration::ZERO);

        assert_eq!(cache.get(&"k"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_size_counts_expired_until_read() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set_with_ttl("stale", 1, Duration::from_millis(5));
        cache.set("fresh", 2);

        std::thread::sleep(Duration::from_millis(20));

        // Lazy eviction: nothing has touched "stale" yet
        assert_eq!(cache.size(), 2);

        assert_eq!(cache.get(&"stale"), None);
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.get(&"fresh"), Some(2));
    }

    #[test]
    fn test_set_overwrites_value_and_expiry() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set_with_ttl("k", 1, Duration::ZERO);
        cache.set("k", 2);

        assert_eq!(cache.get(&"k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set("a", 1);
        cache.set("b", 2);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn test_tuple_keys() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set((true, 10usize, None::<String>), "all");
        cache.set((true, 10usize, Some("crypto".to_string())), "crypto");

        assert_eq!(cache.get(&(true, 10, None)), Some("all"));
        assert_eq!(
            cache.get(&(true, 10, Some("crypto".to_string()))),
            Some("crypto")
        );
        assert_eq!(cache.get(&(false, 10, None)), None);
    }
}
