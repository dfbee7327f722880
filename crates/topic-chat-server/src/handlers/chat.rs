use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

use crate::models::chat::{ChatRequest, ChatResponse};
use crate::services::conversation::{ConversationManager, SessionSnapshot};
use crate::utils::error::ApiError;
use crate::utils::extract::AppJson;

/// Submit one utterance and wait for the reply.
/// Completion failures come back as a normal snapshot with an error entry.
pub async fn chat_handler(
    State(manager): State<Arc<ConversationManager>>,
    AppJson(request): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!("Chat request: message_len={}", request.message.len());

    let outcome = manager.submit(&request.message).await?;

    Ok(Json(ChatResponse {
        new_topic: outcome.is_new_topic(),
        reason: outcome.decision,
        snapshot: outcome.snapshot,
    }))
}

pub async fn session_handler(
    State(manager): State<Arc<ConversationManager>>,
) -> Json<SessionSnapshot> {
    Json(manager.snapshot())
}
