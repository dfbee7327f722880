use serde::{Deserialize, Serialize};

use crate::services::conversation::{SessionSnapshot, TopicSummary};
use crate::services::topic::TopicDecision;

// ===== CORE MODELS =====

/// Speaker of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation. Never mutated once pushed into a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Response language requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
}

impl Language {
    pub fn directive(&self) -> &'static str {
        match self {
            Self::English => "Respond in English.",
            Self::Hindi => "Respond in Hindi.",
            Self::Marathi => "Respond in Marathi.",
        }
    }
}

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SwitchTopicRequest {
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: Language,
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub new_topic: bool,
    pub reason: TopicDecision,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct TopicListResponse {
    pub current_topic: Option<String>,
    pub topics: Vec<TopicSummary>,
}
