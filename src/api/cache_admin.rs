//! `GET /clear-cache`

use axum::{extract::State, http::StatusCode};

use super::state::AppState;
use super::types::{success_status, ApiError};

/// Flushes the store and answers with a plain-text confirmation
pub async fn clear_cache(
    State(state): State<AppState>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let policy = state.response_codes;

    let message = state
        .cache_admin
        .clear_cache()
        .await
        .map_err(|e| ApiError::from(e).with_policy(policy))?;

    Ok((success_status(policy), message))
}
