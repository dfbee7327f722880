use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: String,
    llm_configured: bool,
    activity_queue_len: usize,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Not ready without an API key for the completion endpoint, or while the
/// activity queue is saturated.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, ApiError> {
    if !state.llm_configured {
        return Err(ApiError::ServiceUnavailable(
            "LLM API key is not configured".to_string(),
        ));
    }

    let logger = state.conversation_manager.logger();
    if logger.is_queue_full() {
        return Err(ApiError::ServiceUnavailable(
            "activity log queue is full".to_string(),
        ));
    }

    Ok(Json(ReadinessResponse {
        status: "ready".to_string(),
        llm_configured: true,
        activity_queue_len: logger.queue_len(),
    }))
}
