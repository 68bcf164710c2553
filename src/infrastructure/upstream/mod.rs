//! Upstream infrastructure - Search provider clients

mod http_fetcher;

pub use http_fetcher::HttpSearchFetcher;
