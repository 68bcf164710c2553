//! Redis cache implementation

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use tokio::sync::OnceCell;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    /// Upper bound for connecting and for every single command
    pub operation_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
            operation_timeout: Duration::from_secs(2),
        }
    }
}

impl RedisCacheConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Builds the URL from host and port
    pub fn from_host_port(host: &str, port: u16) -> Self {
        Self::new(format!("redis://{}:{}", host, port))
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the per-operation timeout
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

/// Redis cache implementation
///
/// Holds one multiplexed `ConnectionManager`, established by the first operation
/// that finds Redis reachable. Until then every operation retries the connect
/// and fails with StoreUnavailable. Each operation checks out a clone that is
/// dropped when the operation returns, on success and on error.
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
    connection: Arc<OnceCell<ConnectionManager>>,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl RedisCache {
    /// Validates the URL without touching the network
    pub fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            DomainError::configuration(format!("Invalid Redis URL '{}': {}", config.url, e))
        })?;

        Ok(Self {
            client,
            connection: Arc::new(OnceCell::new()),
            config,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    async fn open_connection(&self) -> Result<ConnectionManager, DomainError> {
        tokio::time::timeout(
            self.config.operation_timeout,
            ConnectionManager::new(self.client.clone()),
        )
        .await
        .map_err(|_| {
            DomainError::store_unavailable(format!(
                "Timed out connecting to Redis at {}",
                self.config.url
            ))
        })?
        .map_err(|e| DomainError::store_unavailable(format!("Failed to connect to Redis: {}", e)))
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    async fn checkout(&self) -> Result<ConnectionManager, DomainError> {
        self.connection
            .get_or_try_init(|| self.open_connection())
            .await
            .cloned()
    }

    /// Runs one command under the operation timeout, mapping every failure to StoreUnavailable
    async fn run<T, F>(&self, action: &str, command: F) -> Result<T, DomainError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.config.operation_timeout, command).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DomainError::store_unavailable(format!(
                "Failed to {}: {}",
                action, e
            ))),
            Err(_) => Err(DomainError::store_unavailable(format!(
                "Timed out after {:?} trying to {}",
                self.config.operation_timeout, action
            ))),
        }
    }

    async fn scan(&self, pattern: &str, count: usize) -> Result<Vec<String>, DomainError> {
        let mut conn = self.checkout().await?;
        let mut cursor = 0u64;
        let mut found = Vec::new();

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = self
                .run(
                    &format!("scan keys with pattern '{}'", pattern),
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(count)
                        .query_async(&mut conn),
                )
                .await?;

            found.extend(keys);
            cursor = new_cursor;

            if cursor == 0 {
                break;
            }
        }

        Ok(found)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.checkout().await?;

        self.run(&format!("get key '{}'", key), conn.get(&prefixed_key))
            .await
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.checkout().await?;

        let ttl_secs = ttl.as_secs().max(1);

        self.run(
            &format!("set key '{}'", key),
            conn.set_ex::<_, _, ()>(&prefixed_key, value, ttl_secs),
        )
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.checkout().await?;

        let deleted: i64 = self
            .run(&format!("delete key '{}'", key), conn.del(&prefixed_key))
            .await?;

        Ok(deleted > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let prefixed_pattern = self.prefix_key(pattern);
        let keys = self.scan(&prefixed_pattern, 100).await?;
        let mut total_deleted = 0usize;

        for chunk in keys.chunks(100) {
            let mut conn = self.checkout().await?;
            let deleted: i64 = self.run("delete keys", conn.del(chunk)).await?;
            total_deleted += deleted as usize;
        }

        Ok(total_deleted)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.checkout().await?;

        self.run(
            &format!("check existence of key '{}'", key),
            conn.exists(&prefixed_key),
        )
        .await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.checkout().await?;

        let ttl_secs = ttl.as_secs().max(1) as i64;

        self.run(
            &format!("update TTL for key '{}'", key),
            conn.expire(&prefixed_key, ttl_secs),
        )
        .await
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.checkout().await?;

        let ttl_secs: i64 = self
            .run(&format!("get TTL for key '{}'", key), conn.ttl(&prefixed_key))
            .await?;

        // Redis returns -2 if key doesn't exist, -1 if no TTL
        if ttl_secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(ttl_secs as u64)))
        }
    }

    async fn clear(&self) -> Result<(), DomainError> {
        // With a prefix only our own keys go; without one the whole server is flushed
        match &self.config.key_prefix {
            Some(_) => {
                self.delete_pattern("*").await?;
            }
            None => {
                let mut conn = self.checkout().await?;
                self.run(
                    "flush all keys",
                    redis::cmd("FLUSHALL").query_async::<()>(&mut conn),
                )
                .await?;
            }
        }

        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        match &self.config.key_prefix {
            Some(_) => {
                let pattern = self.prefix_key("*");
                Ok(self.scan(&pattern, 1000).await?.len())
            }
            None => {
                let mut conn = self.checkout().await?;
                self.run(
                    "get database size",
                    redis::cmd("DBSIZE").query_async::<usize>(&mut conn),
                )
                .await
            }
        }
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.checkout().await?;

        self.run("ping Redis", redis::cmd("PING").query_async::<String>(&mut conn))
            .await?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    // Note: These tests require a running Redis instance
    // Run with: cargo test -- --ignored

    fn get_test_config() -> RedisCacheConfig {
        RedisCacheConfig::new("redis://127.0.0.1:6379").with_key_prefix("search-cache-proxy-test")
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_set_and_get() {
        let cache = RedisCache::new(get_test_config()).unwrap();

        cache
            .set("key1", &"value1", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));

        // Cleanup
        cache.delete("key1").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_ttl_matches_population() {
        let cache = RedisCache::new(get_test_config()).unwrap();

        cache
            .set("ttl_key", &"value1", Duration::from_secs(7200))
            .await
            .unwrap();

        let ttl = cache.ttl("ttl_key").await.unwrap().unwrap();
        assert!(ttl.as_secs() > 7190 && ttl.as_secs() <= 7200);

        // Cleanup
        cache.delete("ttl_key").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_prefixed_clear() {
        let cache = RedisCache::new(get_test_config()).unwrap();

        cache
            .set("a", &1, Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("b", &2, Duration::from_secs(60))
            .await
            .unwrap();

        cache.clear().await.unwrap();

        assert_eq!(cache.size().await.unwrap(), 0);
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let result = RedisCache::new(RedisCacheConfig::new("not a url"));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_per_operation() {
        let config = RedisCacheConfig::new("redis://127.0.0.1:1")
            .with_operation_timeout(Duration::from_millis(300));

        let cache = RedisCache::new(config).unwrap();
        assert!(!cache.is_connected());

        let err = cache.get_raw("key").await.unwrap_err();
        assert!(err.is_store_unavailable());

        let err = cache
            .set_raw("key", "1", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(err.is_store_unavailable());

        assert!(cache.ping().await.is_err());
        assert!(cache.clear().await.unwrap_err().is_store_unavailable());
        assert!(!cache.is_connected());
    }

    #[test]
    fn test_from_host_port() {
        let config = RedisCacheConfig::from_host_port("cache.internal", 6380);
        assert_eq!(config.url, "redis://cache.internal:6380");
        assert_eq!(config.key_prefix, None);
    }
}
