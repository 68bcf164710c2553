//! Clear-cache command - flushes the configured store once

use tracing::info;

use crate::infrastructure::services::CacheAdminService;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let cache = crate::create_cache(&config).await?;
    let message = CacheAdminService::new(cache).clear_cache().await?;

    info!(backend = %config.cache.backend, "{}", message);
    println!("{message}");

    Ok(())
}
