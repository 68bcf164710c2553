//! Cache domain - Key derivation and the store abstraction

mod key;
mod repository;

pub use key::{
    derive_key, CacheKeyGenerator, CacheKeyParams, HashedKeyGenerator, SEARCH_NAMESPACE,
};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
