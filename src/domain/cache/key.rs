//! Cache key generation strategies

use std::fmt::Debug;

use sha2::{Digest, Sha256};

/// Trait for generating cache keys from search parameters
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Generates a cache key from the given components
    fn generate(&self, params: &CacheKeyParams) -> String;

    /// Generates a key with a namespace prefix
    fn generate_with_namespace(&self, namespace: &str, params: &CacheKeyParams) -> String {
        format!("{}:{}", namespace, self.generate(params))
    }
}

/// Parameters for cache key generation
///
/// Components keep their insertion order; two params are equal only when
/// every tag and value matches in the same position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheKeyParams {
    components: Vec<(String, String)>,
}

impl CacheKeyParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tagged component to the key parameters
    pub fn with_component(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.push((tag.into(), value.into()));
        self
    }

    /// Parameters for one search: the resource category and the query term
    pub fn for_search(search_type: &str, search_body: &str) -> Self {
        Self::new()
            .with_component("type", search_type)
            .with_component("q", search_body)
    }

    /// Length-prefixed encoding of every component.
    ///
    /// `("ab", "c")` and `("a", "bc")` encode to different strings because each
    /// value carries its byte length.
    pub fn canonical(&self) -> String {
        self.components
            .iter()
            .map(|(tag, value)| format!("{}:{}:{}", tag, value.len(), value))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Cache key generator hashing the canonical encoding with SHA-256
///
/// Output depends only on the inputs, so keys survive process restarts.
#[derive(Debug, Clone, Default)]
pub struct HashedKeyGenerator;

impl HashedKeyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CacheKeyGenerator for HashedKeyGenerator {
    fn generate(&self, params: &CacheKeyParams) -> String {
        let digest = Sha256::digest(params.canonical().as_bytes());
        hex::encode(digest)
    }
}

/// Namespace every search entry is stored under
pub const SEARCH_NAMESPACE: &str = "search";

/// Derives the cache key for one search request
pub fn derive_key(search_type: &str, search_body: &str) -> String {
    let params = CacheKeyParams::for_search(search_type, search_body);
    HashedKeyGenerator::new().generate_with_namespace(SEARCH_NAMESPACE, &params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_is_deterministic() {
        let first = derive_key("users", "john13245");
        let second = derive_key("users", "john13245");

        assert_eq!(first, second);
    }

    #[test]
    fn test_derive_key_known_value() {
        // Pinned so a change to the encoding is noticed: existing entries would be orphaned
        let params = CacheKeyParams::for_search("users", "john13245");
        assert_eq!(params.canonical(), "type:5:users|q:9:john13245");

        let key = derive_key("users", "john13245");
        assert!(key.starts_with("search:"));
        assert_eq!(key.len(), "search:".len() + 64);
    }

    #[test]
    fn test_concatenation_collision_is_avoided() {
        assert_ne!(derive_key("ab", "c"), derive_key("a", "bc"));
        assert_ne!(derive_key("users", "x"), derive_key("user", "sx"));
    }

    #[test]
    fn test_separator_in_values_does_not_collide() {
        assert_ne!(derive_key("a|q:1:b", "c"), derive_key("a", "b|q:1:c"));
    }

    #[test]
    fn test_canonical_encoding() {
        let params = CacheKeyParams::for_search("repositories", "tokio");

        assert_eq!(params.canonical(), "type:12:repositories|q:5:tokio");
    }

    #[test]
    fn test_components_keep_order() {
        let a = CacheKeyParams::new().with_component("x", "1").with_component("y", "2");
        let b = CacheKeyParams::new().with_component("y", "2").with_component("x", "1");

        assert_ne!(
            HashedKeyGenerator.generate(&a),
            HashedKeyGenerator.generate(&b)
        );
    }
}
