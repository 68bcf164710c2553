//! Cache factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::CacheSettings;
use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported cache types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// Redis cache
    #[default]
    Redis,
    /// In-memory cache using moka
    InMemory,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
        }
    }
}

/// Factory for creating cache instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates the store selected by configuration
    ///
    /// An unreachable Redis is not fatal: the first successful operation connects,
    /// and until then operations fail with StoreUnavailable.
    pub async fn create(&self, settings: &CacheSettings) -> Result<Arc<dyn Cache>, DomainError> {
        match settings.backend {
            CacheType::InMemory => {
                let config = InMemoryCacheConfig::default()
                    .with_max_capacity(settings.max_capacity)
                    .with_max_ttl(settings.ttl().max(InMemoryCacheConfig::default().max_ttl));

                info!(max_capacity = settings.max_capacity, "Using in-memory cache");
                Ok(Arc::new(InMemoryCache::with_config(config)))
            }
            CacheType::Redis => {
                let config = Self::redis_config(settings);

                let url = config.url.clone();
                let cache = RedisCache::new(config)?;

                match cache.ping().await {
                    Ok(()) => info!(url = %url, "Redis connection established"),
                    Err(e) => warn!(
                        url = %url,
                        error = %e,
                        "Redis unreachable at startup, store operations will fail until it is"
                    ),
                }

                Ok(Arc::new(cache))
            }
        }
    }

    fn redis_config(settings: &CacheSettings) -> RedisCacheConfig {
        let mut config = RedisCacheConfig::from_host_port(&settings.redis_host, settings.redis_port)
            .with_operation_timeout(Duration::from_millis(settings.timeout_ms));

        if let Some(prefix) = &settings.key_prefix {
            config = config.with_key_prefix(prefix.clone());
        }

        config
    }
}
