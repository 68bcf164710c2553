//! Cache-aside search service
//!
//! Looks the request up in the store, falls back to the upstream provider on a
//! miss and writes the fetched body back with the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::CacheSettings;
use crate::domain::cache::{derive_key, Cache, CacheExt};
use crate::domain::{
    DomainError, LookupOutcome, PopulateMode, ResultSource, SearchOutcome, SearchRequest,
    SearchResult, StoreErrorPolicy, UpstreamFetcher,
};

/// Configuration for the cache-aside flow
#[derive(Debug, Clone)]
pub struct SearchServiceConfig {
    /// TTL applied to every populated entry
    pub ttl: Duration,
    pub on_store_error: StoreErrorPolicy,
    pub populate_mode: PopulateMode,
}

impl Default for SearchServiceConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(2 * 60 * 60),
            on_store_error: StoreErrorPolicy::Fail,
            populate_mode: PopulateMode::Await,
        }
    }
}

impl SearchServiceConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_store_error_policy(mut self, policy: StoreErrorPolicy) -> Self {
        self.on_store_error = policy;
        self
    }

    pub fn with_populate_mode(mut self, mode: PopulateMode) -> Self {
        self.populate_mode = mode;
        self
    }
}

impl From<&CacheSettings> for SearchServiceConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            ttl: settings.ttl(),
            on_store_error: settings.on_store_error,
            populate_mode: settings.populate_mode,
        }
    }
}

/// Cache-aside orchestrator for search requests
#[derive(Debug)]
pub struct SearchService {
    cache: Arc<dyn Cache>,
    upstream: Arc<dyn UpstreamFetcher>,
    config: SearchServiceConfig,
}

impl SearchService {
    pub fn new(cache: Arc<dyn Cache>, upstream: Arc<dyn UpstreamFetcher>) -> Self {
        Self::with_config(cache, upstream, SearchServiceConfig::default())
    }

    pub fn with_config(
        cache: Arc<dyn Cache>,
        upstream: Arc<dyn UpstreamFetcher>,
        config: SearchServiceConfig,
    ) -> Self {
        Self {
            cache,
            upstream,
            config,
        }
    }

    /// Serves a search from the store or, on a miss, from upstream
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, DomainError> {
        let search_type = request.search_type();
        let search_body = request.search_body();
        let key = derive_key(search_type, search_body);

        let source = match self.lookup(&key).await {
            LookupOutcome::Hit(data) => {
                info!(search_type, cache_key = %key, "Cache hit");
                return Ok(SearchOutcome {
                    result: SearchResult::new(data, search_type),
                    source: ResultSource::Hit,
                });
            }
            LookupOutcome::Miss => {
                info!(search_type, cache_key = %key, "Cache miss");
                ResultSource::Miss
            }
            LookupOutcome::StoreError(error) => match self.config.on_store_error {
                StoreErrorPolicy::Fail => {
                    warn!(search_type, error = %error, "Cache lookup failed");
                    return Err(error);
                }
                StoreErrorPolicy::Bypass => {
                    warn!(search_type, error = %error, "Cache lookup failed, bypassing cache");
                    ResultSource::Bypass
                }
            },
        };

        let data = self
            .upstream
            .fetch(search_type, search_body)
            .await
            .inspect_err(|error| warn!(search_type, error = %error, "Upstream fetch failed"))?;

        // A store that just failed the lookup is not written to
        if source == ResultSource::Miss {
            self.populate(key, &data).await;
        }

        Ok(SearchOutcome {
            result: SearchResult::new(data, search_type),
            source,
        })
    }

    /// Tri-state store lookup; an unreadable entry counts as a miss
    pub async fn lookup(&self, key: &str) -> LookupOutcome {
        match self.cache.get_raw(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(data) => LookupOutcome::Hit(data),
                Err(e) => {
                    warn!(cache_key = %key, error = %e, "Discarding unreadable cache entry");
                    LookupOutcome::Miss
                }
            },
            Ok(None) => LookupOutcome::Miss,
            Err(error) => LookupOutcome::StoreError(error),
        }
    }

    /// Best-effort write; failures are logged and never reach the caller
    async fn populate(&self, key: String, data: &Value) {
        let ttl = self.config.ttl;

        match self.config.populate_mode {
            PopulateMode::Await => {
                if let Err(error) = self.cache.set(&key, data, ttl).await {
                    warn!(cache_key = %key, error = %error, "Failed to populate cache");
                } else {
                    debug!(cache_key = %key, ttl_secs = ttl.as_secs(), "Cache populated");
                }
            }
            PopulateMode::Background => {
                let cache = self.cache.clone();
                let data = data.clone();

                tokio::spawn(async move {
                    if let Err(error) = cache.set(&key, &data, ttl).await {
                        warn!(cache_key = %key, error = %error, "Failed to populate cache");
                    }
                });
            }
        }
    }
}
