//! CLI module for the search cache proxy
//!
//! Subcommands:
//! - `serve`: run the HTTP proxy
//! - `clear-cache`: flush the configured store once and exit

pub mod clear_cache;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Search Cache Proxy - cache-aside front for an upstream search API
#[derive(Parser)]
#[command(name = "search-cache-proxy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP proxy
    Serve,

    /// Remove every cached search response and exit
    ClearCache,
}

/// Loads `.env` and layered configuration, then installs logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
