//! In-memory texture cache with a sliding expiry window.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Default maximum number of textures kept per cache.
pub const DEFAULT_CACHE_SIZE: usize = 4096;

/// Entries not accessed for this long are dropped.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry<V> {
    value: V,
    last_access: Instant,
}

/// LRU-bounded cache whose entries expire after `ttl` without access.
/// Every hit restarts the entry's expiry window.
pub struct MemoryTextureCache<V> {
    cache: Mutex<LruCache<String, Entry<V>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> MemoryTextureCache<V> {
    /// Creates a cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up `key`, resetting its expiry window on a hit.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut cache = self.cache.lock();
        let now = Instant::now();
        let expired = match cache.get_mut(key) {
            Some(entry) if now.duration_since(entry.last_access) < self.ttl => {
                entry.last_access = now;
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key, "Memory cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            cache.pop(key);
            debug!(key, "Memory cache entry expired");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(key, "Memory cache miss");
        None
    }

    /// Looks up `key` without touching its expiry window or LRU position.
    pub fn peek(&self, key: &str) -> Option<V> {
        let cache = self.cache.lock();
        cache
            .peek(key)
            .filter(|entry| entry.last_access.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Stores `value` under `key` with a fresh expiry window.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        trace!(key = %key, "Storing texture in memory cache");
        self.cache.lock().put(
            key,
            Entry {
                value,
                last_access: Instant::now(),
            },
        );
    }

    /// Returns the number of stored entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns true if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }
}

impl<V: Clone> Default for MemoryTextureCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE, DEFAULT_TTL)
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached textures.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} textures, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_put_and_get() {
        let cache = MemoryTextureCache::new(10, DEFAULT_TTL);
        cache.put("skin1", 42u32);

        assert_eq!(cache.get("skin1"), Some(42));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_entry_expires_without_access() {
        let cache = MemoryTextureCache::new(10, Duration::from_millis(30));
        cache.put("skin1", 1u32);

        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.peek("skin1"), None);
        assert_eq!(cache.get("skin1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_access_slides_window() {
        let cache = MemoryTextureCache::new(10, Duration::from_millis(200));
        cache.put("skin1", 1u32);

        for _ in 0..4 {
            std::thread::sleep(Duration::from_millis(60));
            assert_eq!(cache.get("skin1"), Some(1));
        }
    }

    #[test]
    fn test_peek_does_not_slide_window() {
        let cache = MemoryTextureCache::new(10, Duration::from_millis(150));
        cache.put("skin1", 1u32);

        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.peek("skin1"), Some(1));
        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(cache.peek("skin1"), None);
    }

    #[test]
    fn test_capacity_eviction() {
        let cache = MemoryTextureCache::new(2, DEFAULT_TTL);
        cache.put("a", 1u32);
        cache.put("b", 2);
        cache.put("c", 3);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_cache_stats() {
        let cache = MemoryTextureCache::new(10, DEFAULT_TTL);
        cache.put("skin1", 1u32);

        let _ = cache.get("skin1");
        let _ = cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }
}
