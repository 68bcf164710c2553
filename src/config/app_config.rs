use std::time::Duration;

use serde::Deserialize;

use crate::domain::{PopulateMode, StoreErrorPolicy};
use crate::infrastructure::cache::CacheType;

/// Longest TTL accepted for cached search responses (one year)
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheSettings,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
    pub response_codes: ResponseCodePolicy,
}

/// Status codes used for responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseCodePolicy {
    /// 201 for every success, 403 for store and upstream failures
    #[default]
    Legacy,
    /// 200 for success, 502 for upstream failures, 503 for store failures
    Semantic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Store selection and cache-aside policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheType,
    pub redis_host: String,
    pub redis_port: u16,
    pub key_prefix: Option<String>,
    /// TTL applied to every populated entry
    pub ttl_secs: u64,
    /// Upper bound for connecting and for each store command
    pub timeout_ms: u64,
    pub on_store_error: StoreErrorPolicy,
    pub populate_mode: PopulateMode,
    /// Entry limit for the in-memory backend
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            response_codes: ResponseCodePolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheType::default(),
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            key_prefix: None,
            ttl_secs: 2 * 60 * 60,
            timeout_ms: 2000,
            on_store_error: StoreErrorPolicy::default(),
            populate_mode: PopulateMode::default(),
            max_capacity: 10_000,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            timeout_ms: 10_000,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl AppConfig {
    /// Loads `config/default`, `config/local`, `APP__*` variables, then `PORT` and `REDIS_PORT`
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", port_from_env("PORT")?)?
            .set_override_option("cache.redis_port", port_from_env("REDIS_PORT")?)?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.cache.ttl_secs == 0 {
            return Err(config::ConfigError::Message(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }

        if self.cache.ttl_secs > MAX_TTL_SECS {
            return Err(config::ConfigError::Message(format!(
                "cache.ttl_secs must not exceed {} (one year), got {}",
                MAX_TTL_SECS, self.cache.ttl_secs
            )));
        }

        if self.upstream.base_url.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "upstream.base_url must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn port_from_env(var: &str) -> Result<Option<i64>, config::ConfigError> {
    parse_port(var, std::env::var(var).ok())
}

fn parse_port(var: &str, value: Option<String>) -> Result<Option<i64>, config::ConfigError> {
    match value {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<u16>()
            .map(|port| Some(i64::from(port)))
            .map_err(|e| config::ConfigError::Message(format!("{} is not a valid port: {}", var, e))),
        _ => Ok(None),
    }
}
