use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

use crate::models::chat::{LanguageRequest, SwitchTopicRequest, TopicListResponse};
use crate::services::conversation::{ConversationManager, SessionSnapshot};
use crate::utils::error::ApiError;
use crate::utils::extract::AppJson;

pub async fn list_topics_handler(
    State(manager): State<Arc<ConversationManager>>,
) -> Json<TopicListResponse> {
    Json(TopicListResponse {
        current_topic: manager.current_topic(),
        topics: manager.topics(),
    })
}

pub async fn new_topic_handler(
    State(manager): State<Arc<ConversationManager>>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    info!("Starting new topic");
    Ok(Json(manager.start_new_topic()?))
}

pub async fn switch_topic_handler(
    State(manager): State<Arc<ConversationManager>>,
    AppJson(request): AppJson<SwitchTopicRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    info!("Switching topic: label_len={}", request.topic.len());
    Ok(Json(manager.switch_to_topic(&request.topic)?))
}

pub async fn language_handler(
    State(manager): State<Arc<ConversationManager>>,
    AppJson(request): AppJson<LanguageRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    info!("Language change: {:?}", request.language);
    Ok(Json(manager.set_language(request.language)?))
}
