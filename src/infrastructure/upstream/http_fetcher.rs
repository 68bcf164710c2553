use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::domain::{DomainError, UpstreamFetcher};

/// Search provider reached over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpSearchFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSearchFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, DomainError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            DomainError::configuration(format!(
                "Invalid upstream base URL '{}': {}",
                config.base_url, e
            ))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(DomainError::configuration(format!(
                "Upstream base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Self::build_client(config.timeout(), &config.user_agent)?;

        Ok(Self { client, base_url })
    }

    fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, DomainError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))
    }

    /// `{base}/search/{search_type}?q={search_body}`, with both parts percent-encoded
    fn search_url(&self, search_type: &str, search_body: &str) -> Result<Url, DomainError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| DomainError::internal("Upstream base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["search", search_type]);

        url.query_pairs_mut().clear().append_pair("q", search_body);

        Ok(url)
    }
}

#[async_trait]
impl UpstreamFetcher for HttpSearchFetcher {
    async fn fetch(&self, search_type: &str, search_body: &str) -> Result<Value, DomainError> {
        let url = self.search_url(search_type, search_body)?;
        debug!(url = %url, "Fetching from upstream");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::upstream(format!("Request timed out: {}", e))
                } else {
                    DomainError::upstream(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::upstream_status(status.as_u16(), error_body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DomainError::upstream(format!("Failed to read response body: {}", e)))?;

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(base_url: &str) -> UpstreamConfig {
        UpstreamConfig {
            base_url: base_url.to_string(),
            timeout_ms: 500,
            ..Default::default()
        }
    }

    #[test]
    fn test_search_url() {
        let fetcher = HttpSearchFetcher::new(&config_for("https://api.github.com/")).unwrap();
        let url = fetcher.search_url("users", "john13245").unwrap();

        assert_eq!(url.as_str(), "https://api.github.com/search/users?q=john13245");
    }

    #[test]
    fn test_search_url_encodes_input() {
        let fetcher = HttpSearchFetcher::new(&config_for("http://localhost:9000/api")).unwrap();
        let url = fetcher.search_url("a/b", "rust lang&x=1").unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:9000/api/search/a%2Fb?q=rust+lang%26x%3D1"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpSearchFetcher::new(&config_for("not a url"));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/users"))
            .and(query_param("q", "john13245"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 1,
                "items": [{"login": "john13245"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpSearchFetcher::new(&config_for(&server.uri())).unwrap();
        let body = fetcher.fetch("users", "john13245").await.unwrap();

        assert_eq!(body["total_count"], 1);
        assert_eq!(body["items"][0]["login"], "john13245");
    }

    #[tokio::test]
    async fn test_fetch_non_json_body_is_passed_through() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/users"))
            .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
            .mount(&server)
            .await;

        let fetcher = HttpSearchFetcher::new(&config_for(&server.uri())).unwrap();
        let body = fetcher.fetch("users", "x").await.unwrap();

        assert_eq!(body, Value::String("plain text".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_error_status_keeps_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/users"))
            .respond_with(
                ResponseTemplate::new(422).set_body_string("{\"message\":\"Validation Failed\"}"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpSearchFetcher::new(&config_for(&server.uri())).unwrap();
        let err = fetcher.fetch("users", "").await.unwrap_err();

        match err {
            DomainError::Upstream { status, body, .. } => {
                assert_eq!(status, Some(422));
                assert_eq!(body.as_deref(), Some("{\"message\":\"Validation Failed\"}"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let fetcher = HttpSearchFetcher::new(&config_for(&server.uri())).unwrap();
        let err = fetcher.fetch("users", "slow").await.unwrap_err();

        assert!(matches!(err, DomainError::Upstream { status: None, .. }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_upstream_error() {
        let fetcher = HttpSearchFetcher::new(&config_for("http://127.0.0.1:1")).unwrap();
        let err = fetcher.fetch("users", "x").await.unwrap_err();

        assert!(matches!(err, DomainError::Upstream { status: None, .. }));
    }
}
