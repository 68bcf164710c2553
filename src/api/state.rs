//! Application state for shared services

use std::sync::Arc;

use crate::config::{AppConfig, ResponseCodePolicy};
use crate::domain::{Cache, UpstreamFetcher};
use crate::infrastructure::services::{CacheAdminService, SearchService, SearchServiceConfig};

/// Services shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub search_service: Arc<SearchService>,
    pub cache_admin: Arc<CacheAdminService>,
    pub response_codes: ResponseCodePolicy,
}

impl AppState {
    pub fn new(
        search_service: Arc<SearchService>,
        cache_admin: Arc<CacheAdminService>,
        response_codes: ResponseCodePolicy,
    ) -> Self {
        Self {
            search_service,
            cache_admin,
            response_codes,
        }
    }

    /// Wires both services around one store handle
    pub fn from_parts(
        cache: Arc<dyn Cache>,
        upstream: Arc<dyn UpstreamFetcher>,
        config: &AppConfig,
    ) -> Self {
        let search_service = SearchService::with_config(
            cache.clone(),
            upstream,
            SearchServiceConfig::from(&config.cache),
        );

        Self::new(
            Arc::new(search_service),
            Arc::new(CacheAdminService::new(cache)),
            config.server.response_codes,
        )
    }
}
