//! Search Cache Proxy
//!
//! A cache-aside proxy in front of an upstream search API:
//! - Requests are served from a key-value store when an entry exists
//! - Misses are fetched from upstream and stored with a fixed TTL
//! - Store and upstream failures are isolated from each other

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{Cache, UpstreamFetcher};
use infrastructure::cache::CacheFactory;
use infrastructure::upstream::HttpSearchFetcher;
use tracing::info;

/// Connects the configured store and upstream client and wires the services
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let cache = create_cache(config).await?;

    let upstream: Arc<dyn UpstreamFetcher> = Arc::new(HttpSearchFetcher::new(&config.upstream)?);
    info!(base_url = %config.upstream.base_url, "Upstream search provider configured");

    Ok(AppState::from_parts(cache, upstream, config))
}

/// Opens the configured store
pub async fn create_cache(config: &AppConfig) -> anyhow::Result<Arc<dyn Cache>> {
    let cache = CacheFactory::new().create(&config.cache).await?;
    info!(backend = cache.backend_name(), "Cache store ready");

    Ok(cache)
}
