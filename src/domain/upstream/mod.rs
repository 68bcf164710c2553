//! Upstream domain - The external search provider

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Single-attempt call to the external search provider
///
/// Implementations fail with `DomainError::Upstream` on transport errors,
/// timeouts and non-success statuses. They never retry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UpstreamFetcher: Send + Sync + std::fmt::Debug {
    /// Fetches `search/{search_type}?q={search_body}` and returns the body
    async fn fetch(&self, search_type: &str, search_body: &str) -> Result<Value, DomainError>;
}
