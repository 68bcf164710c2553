//! Store maintenance operations

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::domain::{Cache, DomainError};

/// Confirmation text returned once the store is flushed
pub const CACHE_CLEARED_MESSAGE: &str = "Cache cleared successfully";

/// Administrative access to the response store
#[derive(Debug, Clone)]
pub struct CacheAdminService {
    cache: Arc<dyn Cache>,
}

impl CacheAdminService {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Removes every cached search response
    pub async fn clear_cache(&self) -> Result<&'static str, DomainError> {
        self.cache
            .clear()
            .await
            .inspect_err(|error| warn!(error = %error, "Failed to clear cache"))?;

        info!(backend = self.backend_name(), "Cache cleared");
        Ok(CACHE_CLEARED_MESSAGE)
    }

    /// Round-trips a PING to the store and reports its latency
    pub async fn check_store(&self) -> Result<Duration, DomainError> {
        let started = Instant::now();
        self.cache.ping().await?;
        Ok(started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{derive_key, MockCache};
    use serde_json::json;

    #[tokio::test]
    async fn test_clear_cache_removes_entries() {
        let key = derive_key("users", "john13245");
        let cache = Arc::new(MockCache::new().with_entry(&key, &json!({"n": 1}), None));
        let service = CacheAdminService::new(cache.clone());

        let message = service.clear_cache().await.unwrap();

        assert_eq!(message, CACHE_CLEARED_MESSAGE);
        assert_eq!(cache.clear_calls(), 1);
        assert!(!cache.contains(&key));
    }

    #[tokio::test]
    async fn test_clear_empty_cache() {
        let cache = Arc::new(MockCache::new());
        let service = CacheAdminService::new(cache.clone());

        assert!(service.clear_cache().await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_cache_store_failure() {
        let cache = Arc::new(MockCache::new().with_error("Connection refused"));
        let service = CacheAdminService::new(cache);

        let err = service.clear_cache().await.unwrap_err();
        assert!(err.is_store_unavailable());
    }

    #[tokio::test]
    async fn test_check_store() {
        let healthy = CacheAdminService::new(Arc::new(MockCache::new()));
        assert!(healthy.check_store().await.is_ok());

        let broken = CacheAdminService::new(Arc::new(MockCache::new().with_error("down")));
        assert!(broken.check_store().await.is_err());
    }
}
