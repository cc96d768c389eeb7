// src/services/cache.rs
// DOCUMENTATION: Simple in-memory cache for aggregate statistics
// PURPOSE: Avoid recomputing dashboard aggregates on every request

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const PLATFORM_STATS_KEY: &str = "stats:platform";
pub const ADMIN_STATS_KEY: &str = "stats:admin";

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// In-memory cache with TTL holding serialized JSON
/// DOCUMENTATION: Thread-safe; shared through web::Data<Arc<StatsCache>>
pub struct StatsCache {
    store: Arc<RwLock<HashMap<String, CacheEntry<String>>>>,
    default_ttl: Duration,
}

impl StatsCache {
    /// Create new cache with default TTL
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Get cached value
    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;

        match store.get(key) {
            Some(entry) if !entry.is_expired() => {
                log::debug!("Cache HIT for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                log::debug!("Cache EXPIRED for key: {}", key);
                None
            }
            None => {
                log::debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    /// Get and deserialize a cached value; corrupt entries count as misses
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        serde_json::from_str(&raw)
            .map_err(|e| log::warn!("Discarding unreadable cache entry {}: {}", key, e))
            .ok()
    }

    /// Set cached value with default TTL
    pub async fn set(&self, key: String, value: String) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key.to_string(), raw).await,
            Err(e) => log::warn!("Could not cache {}: {}", key, e),
        }
    }

    /// Set cached value with custom TTL
    pub async fn set_with_ttl(&self, key: String, value: String, ttl: Duration) {
        let mut store = self.store.write().await;
        log::debug!("Cache SET for key: {} (TTL: {}s)", key, ttl.as_secs());
        store.insert(key, CacheEntry::new(value, ttl));
    }

    /// Drop a single key, e.g. after a write that changes the aggregate
    pub async fn invalidate(&self, key: &str) {
        self.store.write().await.remove(key);
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Cache cleanup: removed {} expired entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

/// Cache statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_cleanup_task(cache: Arc<StatsCache>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlatformStats;

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = StatsCache::new(60);
        cache.set("key".to_string(), "value".to_string()).await;
        assert_eq!(cache.get("key").await, Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_cache_json_roundtrip() {
        let cache = StatsCache::new(60);
        let stats = PlatformStats {
            total_raised: 1_500_000,
            total_donors: 12,
            active_campaigns: 3,
        };
        cache.set_json(PLATFORM_STATS_KEY, &stats).await;

        let cached: PlatformStats = cache.get_json(PLATFORM_STATS_KEY).await.unwrap();
        assert_eq!(cached.total_raised, 1_500_000);
        assert_eq!(cached.active_campaigns, 3);
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_a_miss() {
        let cache = StatsCache::new(60);
        cache.set(ADMIN_STATS_KEY.to_string(), "not json".to_string()).await;
        assert!(cache.get_json::<PlatformStats>(ADMIN_STATS_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_expiration_and_cleanup() {
        let cache = StatsCache::new(60);
        cache
            .set_with_ttl("short".to_string(), "v".to_string(), Duration::from_millis(50))
            .await;
        cache.set("long".to_string(), "v".to_string()).await;

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get("short").await.is_none());

        cache.cleanup().await;
        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.active_entries, 1);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = StatsCache::new(60);
        cache.set("key".to_string(), "value".to_string()).await;
        cache.invalidate("key").await;
        assert!(cache.get("key").await.is_none());
    }
}
