//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, LogFormat, LoggingConfig, ResponseCodePolicy, ServerConfig,
    UpstreamConfig, MAX_TTL_SECS,
};
