//! Domain layer - Core cache-aside types and contracts

pub mod cache;
pub mod error;
pub mod search;
pub mod upstream;

pub use cache::{derive_key, Cache, CacheExt, CacheKeyGenerator, CacheKeyParams, HashedKeyGenerator};
pub use error::DomainError;
pub use search::{
    LookupOutcome, PopulateMode, ResultSource, SearchOutcome, SearchRequest, SearchResult,
    StoreErrorPolicy,
};
pub use upstream::UpstreamFetcher;
