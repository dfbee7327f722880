use crate::models::chat::{ChatMessage, Language};

/// Transcript entries forwarded with each request
pub const MAX_CONTEXT_MESSAGES: usize = 5;

/// Prior transcript length above which the model is told to build on earlier answers
const CONTINUATION_MIN_TURNS: usize = 2;

/// Pieces of the System message
#[derive(Debug, Clone)]
pub struct SystemContextComponents {
    pub base_instruction: String,
    pub language_directive: String,
    pub topic_directive: String,
    pub continuation_note: Option<String>,
}

impl SystemContextComponents {
    pub fn build(&self) -> String {
        let mut parts = vec![
            format!("{} {}", self.base_instruction, self.language_directive),
            self.topic_directive.clone(),
        ];

        if let Some(note) = &self.continuation_note {
            parts.push(note.clone());
        }

        parts.join("\n")
    }
}

/// Composes the outbound completion request
pub struct ContextBuilder {
    base_instruction: String,
}

impl ContextBuilder {
    pub fn new(base_instruction: String) -> Self {
        Self { base_instruction }
    }

    /// `prior_turns` is the transcript length before the new user turn
    pub fn build_system_instruction(
        &self,
        language: Language,
        new_topic: bool,
        utterance: &str,
        current_topic: &str,
        prior_turns: usize,
    ) -> String {
        let topic_directive = if new_topic {
            format!(
                "The user has started a new topic: \"{}\". Please respond directly to this new topic.",
                utterance
            )
        } else {
            format!(
                "The current topic is: \"{}\". Continue providing information within this context.",
                current_topic
            )
        };

        let continuation_note = (prior_turns > CONTINUATION_MIN_TURNS).then(|| {
            "This is a continuation of a conversation. Build upon previous responses.".to_string()
        });

        SystemContextComponents {
            base_instruction: self.base_instruction.clone(),
            language_directive: language.directive().to_string(),
            topic_directive,
            continuation_note,
        }
        .build()
    }

    /// System message followed by the last [`MAX_CONTEXT_MESSAGES`] transcript entries
    pub fn build_request(&self, system_instruction: String, transcript: &[ChatMessage]) -> Vec<ChatMessage> {
        let start = transcript.len().saturating_sub(MAX_CONTEXT_MESSAGES);

        let mut messages = Vec::with_capacity(MAX_CONTEXT_MESSAGES + 1);
        messages.push(ChatMessage::system(system_instruction));
        messages.extend_from_slice(&transcript[start..]);
        messages
    }
}
