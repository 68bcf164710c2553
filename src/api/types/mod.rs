//! Request and response types for the HTTP layer

pub mod error;
pub mod json;
pub mod search;

pub use error::{success_status, ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use search::{AliveResponse, SearchRequestBody};
