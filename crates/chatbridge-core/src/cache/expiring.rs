//! Bounded, time-expiring LRU cache.
//!
//! `ExpiringCache` maps keys to cloneable values with a maximum entry count
//! and a per-entry time-to-live. Expired entries are dropped lazily when
//! they are looked up; on overflow, expired entries are purged first and then
//! the least-recently-used entry is evicted. Both `get` and `set` count as
//! a use.
//!
//! The TTL is fixed when an entry is inserted; reads do not extend it.
//! Time is read from `tokio::time::Instant` so paused-clock tests can drive
//! expiry deterministically.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Thread-safe bounded cache with per-entry TTL and LRU eviction.
///
/// All operations take a short internal lock; callers never need external
/// synchronization. Values are cloned out on read, so store `Arc`s for
/// anything expensive.
pub struct ExpiringCache<K, V> {
    inner: Mutex<LruCache<K, CacheEntry<V>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> ExpiringCache<K, V> {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a live entry, marking it most recently used.
    ///
    /// Returns `None` if the key is absent or expired; an expired entry is
    /// removed as a side effect.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        take_live(&mut inner, key, Instant::now())
    }

    /// Insert or replace an entry with the given time-to-live.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        insert(&mut inner, key, value, ttl);
    }

    /// Return the live entry for `key`, or build, insert and return a new one.
    ///
    /// Lookup and insertion happen under one lock, so concurrent callers for
    /// the same key all observe the same value. `build` runs while the lock
    /// is held and must not touch this cache.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        ttl: Duration,
        build: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        if let Some(value) = take_live(&mut inner, &key, Instant::now()) {
            return Ok(value);
        }

        let value = build()?;
        insert(&mut inner, key, value.clone(), ttl);
        Ok(value)
    }

    /// Remove an entry if present.
    pub fn delete(&self, key: &K) {
        self.inner.lock().expect("cache lock poisoned").pop(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.inner.lock().expect("cache lock poisoned").clear();
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Promote and clone a live entry; drop it if it has expired.
fn take_live<K: Eq + Hash, V: Clone>(
    cache: &mut LruCache<K, CacheEntry<V>>,
    key: &K,
    now: Instant,
) -> Option<V> {
    if cache.peek(key).is_some_and(|entry| entry.is_expired(now)) {
        cache.pop(key);
        return None;
    }
    cache.get(key).map(|entry| entry.value.clone())
}

/// Insert, purging expired entries first when a new key would overflow so
/// the LRU victim is only chosen among live entries.
fn insert<K: Eq + Hash + Clone, V>(
    cache: &mut LruCache<K, CacheEntry<V>>,
    key: K,
    value: V,
    ttl: Duration,
) {
    let now = Instant::now();
    if !cache.contains(&key) && cache.len() >= cache.cap().get() {
        let expired: Vec<K> = cache
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            cache.pop(key);
        }
    }
    cache.put(
        key,
        CacheEntry {
            value,
            expires_at: now + ttl,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_set_then_get() {
        let cache = ExpiringCache::new(4);
        cache.set("a", 1, HOUR);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"missing"), None);
    }

    #[test]
    fn test_set_replaces_value() {
        let cache = ExpiringCache::new(4);
        cache.set("a", 1, HOUR);
        cache.set("a", 2, HOUR);
        assert_eq!(cache.get(&"a"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overflow_evicts_least_recently_set() {
        let cache = ExpiringCache::new(2);
        cache.set("a", 1, HOUR);
        cache.set("b", 2, HOUR);
        cache.set("c", 3, HOUR);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn test_get_refreshes_recency() {
        let cache = ExpiringCache::new(2);
        cache.set("a", 1, HOUR);
        cache.set("b", 2, HOUR);

        // "a" becomes most recently used, so "b" is evicted next.
        assert_eq!(cache.get(&"a"), Some(1));
        cache.set("c", 3, HOUR);

        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let cache = ExpiringCache::new(3);
        for i in 0..50 {
            cache.set(i, i, HOUR);
            assert!(cache.len() <= 3);
        }
        // The three most recent survive.
        assert_eq!(cache.get(&47), Some(47));
        assert_eq!(cache.get(&48), Some(48));
        assert_eq!(cache.get(&49), Some(49));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_absent_and_removed() {
        let cache = ExpiringCache::new(4);
        cache.set("a", 1, Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get(&"a"), Some(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_does_not_extend_ttl() {
        let cache = ExpiringCache::new(4);
        cache.set("a", 1, Duration::from_secs(10));

        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(3)).await;
            assert_eq!(cache.get(&"a"), Some(1));
        }
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(&"a"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_prefers_expired_entries() {
        let cache = ExpiringCache::new(2);
        cache.set("short", 1, Duration::from_secs(1));
        cache.set("long", 2, HOUR);
        // "short" is now the most recently used but already expired.
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(&"long"), Some(2));

        cache.set("new", 3, HOUR);
        assert_eq!(cache.get(&"long"), Some(2));
        assert_eq!(cache.get(&"new"), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_holds_one_entry() {
        let cache = ExpiringCache::new(0);
        cache.set("a", 1, HOUR);
        cache.set("b", 2, HOUR);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"b"), Some(2));
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = ExpiringCache::new(4);
        cache.set("a", 1, HOUR);
        cache.set("b", 2, HOUR);

        cache.delete(&"a");
        cache.delete(&"never-there");
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn test_get_or_try_insert_with_builds_once() {
        let cache: ExpiringCache<&str, u32> = ExpiringCache::new(4);
        let first: Result<u32, ()> = cache.get_or_try_insert_with("a", HOUR, || Ok(1));
        let second: Result<u32, ()> = cache.get_or_try_insert_with("a", HOUR, || Ok(2));
        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
    }

    #[test]
    fn test_get_or_try_insert_with_propagates_error() {
        let cache: ExpiringCache<&str, u32> = ExpiringCache::new(4);
        let result = cache.get_or_try_insert_with("a", HOUR, || Err("boom"));
        assert_eq!(result, Err("boom"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(ExpiringCache::new(16));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        cache.set(t * 1000 + i, i, HOUR);
                        let _ = cache.get(&(t * 1000 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 16);
    }
}
