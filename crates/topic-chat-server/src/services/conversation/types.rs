use serde::Serialize;

use crate::models::chat::{ChatMessage, Language};
use crate::services::topic::{TopicDecision, TopicStore};
use crate::utils::text::truncate_text;

/// Topic labels are shown cut to this many characters
pub const TOPIC_DISPLAY_CHARS: usize = 40;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// No current topic
    Idle,
    /// A topic is open and its transcript is accumulating
    Active,
}

/// Turn handed to the completion collaborator and not answered yet
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub request_id: String,
    pub utterance: String,
}

/// Complete mutable conversation state of the single session
#[derive(Debug, Clone)]
pub struct Session {
    /// Label of the open topic (its opening utterance)
    pub current_topic: Option<String>,

    /// Turns of the open topic
    pub transcript: Vec<ChatMessage>,

    /// Display entries of the open topic
    pub rendered_log: Vec<String>,

    /// Archived topics, most-recent-first
    pub store: TopicStore,

    /// True until the first topic is opened, re-armed by an explicit new topic
    pub first_message: bool,

    /// A new topic replaced a previous one and has not been answered yet
    pub topic_changed: bool,

    pub language: Language,

    /// Every accepted utterance, most-recent-first
    pub query_history: Vec<String>,

    pub pending: Option<PendingTurn>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            current_topic: None,
            transcript: Vec::new(),
            rendered_log: Vec::new(),
            store: TopicStore::new(),
            first_message: true,
            topic_changed: false,
            language: Language::default(),
            query_history: Vec::new(),
            pending: None,
        }
    }

    pub fn phase(&self) -> ConversationPhase {
        match self.current_topic.as_deref() {
            Some(label) if !label.is_empty() => ConversationPhase::Active,
            _ => ConversationPhase::Idle,
        }
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.pending.is_some()
    }

    /// Move the open topic into the archive (no-op for an empty topic)
    /// and clear the working state. Returns the archived label, if any.
    pub fn archive_current(&mut self) -> Option<String> {
        let label = self.current_topic.take();
        let transcript = std::mem::take(&mut self.transcript);
        let rendered_log = std::mem::take(&mut self.rendered_log);

        let label = label?;
        self.store
            .archive_current(&label, &transcript, &rendered_log)
            .then_some(label)
    }

    pub fn topic_summaries(&self) -> Vec<TopicSummary> {
        let current = self.current_topic.as_deref();
        self.store
            .list_topics()
            .iter()
            .map(|label| TopicSummary {
                label: label.clone(),
                display_label: truncate_text(label, TOPIC_DISPLAY_CHARS),
                active: current == Some(label.as_str()),
            })
            .collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            awaiting_reply: self.is_awaiting_reply(),
            current_topic: self.current_topic.clone(),
            transcript: self.transcript.clone(),
            rendered_log: self.rendered_log.clone(),
            topics: self.topic_summaries(),
            language: self.language,
            topic_changed: self.topic_changed,
            query_history: self.query_history.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Archived topic as shown in the topic menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub label: String,
    pub display_label: String,
    pub active: bool,
}

/// Immutable view of the session handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: ConversationPhase,
    pub awaiting_reply: bool,
    pub current_topic: Option<String>,
    pub transcript: Vec<ChatMessage>,
    pub rendered_log: Vec<String>,
    pub topics: Vec<TopicSummary>,
    pub language: Language,
    pub topic_changed: bool,
    pub query_history: Vec<String>,
}

/// Result of the synchronous half of a submission
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    pub request_id: String,
    pub decision: TopicDecision,
    /// System instruction followed by the recent transcript
    pub messages: Vec<ChatMessage>,
}

/// Result of a full submission
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub decision: TopicDecision,
    pub messages: Vec<ChatMessage>,
    pub snapshot: SessionSnapshot,
}

impl TurnOutcome {
    pub fn is_new_topic(&self) -> bool {
        self.decision.is_new_topic()
    }
}
