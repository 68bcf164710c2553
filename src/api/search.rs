//! `POST /search`

use axum::{
    extract::State,
    http::HeaderName,
    response::{IntoResponse, Response},
};

use crate::domain::SearchRequest;

use super::state::AppState;
use super::types::{success_status, ApiError, Json, SearchRequestBody};

/// Reports whether the body came from the store (`HIT`), upstream (`MISS`) or
/// upstream with the store skipped (`BYPASS`)
pub static X_CACHE: HeaderName = HeaderName::from_static("x-cache");

pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequestBody>,
) -> Result<Response, ApiError> {
    let policy = state.response_codes;

    let request =
        SearchRequest::try_from(body).map_err(|e| ApiError::from(e).with_policy(policy))?;

    let outcome = state
        .search_service
        .search(&request)
        .await
        .map_err(|e| ApiError::from(e).with_policy(policy))?;

    Ok((
        success_status(policy),
        [(X_CACHE.clone(), outcome.source.as_str())],
        Json(outcome.result),
    )
        .into_response())
}
