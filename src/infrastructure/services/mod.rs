//! Infrastructure services

mod cache_admin_service;
mod search_service;

pub use cache_admin_service::{CacheAdminService, CACHE_CLEARED_MESSAGE};
pub use search_service::{SearchService, SearchServiceConfig};
