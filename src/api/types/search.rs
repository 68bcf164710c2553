//! Search endpoint payloads

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, SearchRequest};

/// `POST /search` body; presence is checked after deserialization
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequestBody {
    #[serde(default)]
    pub search_type: Option<String>,
    #[serde(default)]
    pub search_body: Option<String>,
}

impl TryFrom<SearchRequestBody> for SearchRequest {
    type Error = DomainError;

    fn try_from(body: SearchRequestBody) -> Result<Self, Self::Error> {
        SearchRequest::new(body.search_type, body.search_body)
    }
}

/// `GET /` liveness body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliveResponse {
    pub response: String,
}

impl AliveResponse {
    pub fn alive() -> Self {
        Self {
            response: "I am alive".to_string(),
        }
    }
}
