//! Storage usage handler.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, UsageResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionSecret;

/// GET /api/usage - Space used per type, with dashboard cards.
pub async fn get_usage(
    State(state): State<Arc<AppState>>,
    session: SessionSecret,
) -> Result<Json<ApiResponse<UsageResponse>>, ApiError> {
    let total = state
        .files
        .get_total_space_used(session.as_deref())
        .await
        .map_err(ApiError::failed("calculate total space used"))?;

    Ok(Json(ApiResponse::new(UsageResponse::new(total, &state.timezone))))
}
