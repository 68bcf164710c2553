//! In-memory cache implementation using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Cap for moka's `time_to_live`; moka panics above 1000 years
const MOKA_MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Hard upper bound on any entry's lifetime, whatever TTL it was set with
    pub max_ttl: Duration,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            max_ttl: Duration::from_secs(24 * 3600),
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_max_ttl(mut self, ttl: Duration) -> Self {
        self.max_ttl = ttl;
        self
    }
}

/// Cache entry stored in moka
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized JSON value
    data: String,
    /// Expiration timestamp (millis since epoch)
    expires_at: u64,
}

/// Process-local cache for development and tests
///
/// Per-entry TTLs are checked on read; moka evicts by capacity and `max_ttl`.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.max_ttl.min(MOKA_MAX_TTL))
            .build();

        Self { cache }
    }

    fn current_time_millis() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn is_expired(entry: &CacheEntry) -> bool {
        Self::current_time_millis() >= entry.expires_at
    }

    /// Returns the entry if present and still live, dropping it otherwise
    async fn live_entry(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.cache.get(key).await?;

        if Self::is_expired(&entry) {
            self.cache.remove(key).await;
            return None;
        }

        Some(entry)
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.live_entry(key).await.map(|entry| entry.data))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let expires_at = Self::current_time_millis().saturating_add(ttl_millis);
        let entry = CacheEntry {
            data: value.to_string(),
            expires_at,
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let pattern_regex = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
        let regex = regex::Regex::new(&pattern_regex)
            .map_err(|e| DomainError::internal(format!("Invalid pattern: {}", e)))?;

        self.cache.run_pending_tasks().await;

        let keys_to_delete: Vec<String> = self
            .cache
            .iter()
            .filter(|(k, _)| regex.is_match(k.as_str()))
            .map(|(k, _)| (*k).clone())
            .collect();

        let mut deleted = 0;

        for key in keys_to_delete {
            if self.cache.remove(&key).await.is_some() {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.live_entry(key).await.is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, DomainError> {
        match self.live_entry(key).await {
            Some(entry) => {
                let new_entry = CacheEntry {
                    data: entry.data,
                    expires_at: Self::current_time_millis() + ttl.as_millis() as u64,
                };

                self.cache.insert(key.to_string(), new_entry).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        Ok(self.live_entry(key).await.map(|entry| {
            let remaining = entry.expires_at.saturating_sub(Self::current_time_millis());
            Duration::from_millis(remaining)
        }))
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        self.cache.run_pending_tasks().await;
        Ok(self.cache.entry_count() as usize)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = InMemoryCache::new();

        let result: Option<String> = cache.get("missing").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = InMemoryCache::new();

        cache.set("key1", &"old", Duration::from_secs(60)).await.unwrap();
        cache.set("key1", &"new", Duration::from_secs(60)).await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.delete("key1").await.unwrap());
        assert!(!cache.delete("key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_millis(50))
            .await
            .unwrap();

        assert!(cache.exists("key1").await.unwrap());

        tokio::time::sleep(Duration::from_millis(100)).await;

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_ttl_remaining() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_secs(7200))
            .await
            .unwrap();

        let remaining = cache.ttl("key1").await.unwrap().unwrap();
        assert!(remaining.as_secs() > 7190 && remaining.as_secs() <= 7200);
    }

    #[tokio::test]
    async fn test_expire() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.expire("key1", Duration::from_secs(2)).await.unwrap());
        assert!(!cache.expire("missing", Duration::from_secs(2)).await.unwrap());

        let ttl = cache.ttl("key1").await.unwrap().unwrap();
        assert!(ttl.as_secs() <= 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("key2", &"value2", Duration::from_secs(60))
            .await
            .unwrap();

        cache.clear().await.unwrap();

        assert_eq!(cache.size().await.unwrap(), 0);
        assert!(cache.get_raw("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_pattern() {
        let cache = InMemoryCache::new();

        cache
            .set("search:1", &"data1", Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("search:2", &"data2", Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("other:key", &"data3", Duration::from_secs(60))
            .await
            .unwrap();

        let deleted = cache.delete_pattern("search:*").await.unwrap();
        assert_eq!(deleted, 2);

        assert_eq!(cache.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_max_ttl_caps_entry_lifetime() {
        let config = InMemoryCacheConfig::default().with_max_ttl(Duration::from_millis(50));
        let cache = InMemoryCache::with_config(config);

        cache
            .set_raw("key", "\"v\"", Duration::from_secs(3600))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get_raw("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_oversized_ttls_do_not_overflow() {
        let config = InMemoryCacheConfig::default().with_max_ttl(Duration::MAX);
        let cache = InMemoryCache::with_config(config);

        cache.set_raw("key", "\"v\"", Duration::MAX).await.unwrap();

        assert_eq!(cache.get_raw("key").await.unwrap(), Some("\"v\"".to_string()));
        assert!(cache.ttl("key").await.unwrap().is_some());
    }
}
