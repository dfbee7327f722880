use std::sync::Arc;
use axum::extract::FromRef;

use crate::services::conversation::ConversationManager;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub conversation_manager: Arc<ConversationManager>,

    /// An API key is set for the completion endpoint
    pub llm_configured: bool,
}

impl FromRef<AppState> for Arc<ConversationManager> {
    fn from_ref(state: &AppState) -> Self {
        state.conversation_manager.clone()
    }
}
