use serde::{Deserialize, Serialize};

use crate::models::chat::ChatMessage;

/// Tuning knobs of the topic heuristic.
/// Defaults reproduce the reference behavior and should not be "improved".
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TopicThresholds {
    /// Max share of new words seen in topic/recent turns to count as unrelated
    pub overlap_threshold: f64,
    /// Max share of new words seen in the topic for a question to count as unanchored
    pub question_overlap_threshold: f64,
    /// Utterance must be longer than this multiple of the topic label...
    pub length_factor: usize,
    /// ...and longer than this many characters to count as a shift
    pub min_shift_length: usize,
    /// Overlap rules only apply to utterances with at least this many words
    pub min_token_count: usize,
    /// Number of trailing transcript turns treated as recent context
    pub recent_window: usize,
}

pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.2;
pub const DEFAULT_QUESTION_OVERLAP_THRESHOLD: f64 = 0.3;
pub const DEFAULT_LENGTH_FACTOR: usize = 2;
pub const DEFAULT_MIN_SHIFT_LENGTH: usize = 50;
pub const DEFAULT_MIN_TOKEN_COUNT: usize = 3;
pub const DEFAULT_RECENT_WINDOW: usize = 4;

impl Default for TopicThresholds {
    fn default() -> Self {
        Self {
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            question_overlap_threshold: DEFAULT_QUESTION_OVERLAP_THRESHOLD,
            length_factor: DEFAULT_LENGTH_FACTOR,
            min_shift_length: DEFAULT_MIN_SHIFT_LENGTH,
            min_token_count: DEFAULT_MIN_TOKEN_COUNT,
            recent_window: DEFAULT_RECENT_WINDOW,
        }
    }
}

/// Saved state of a topic the user moved away from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchivedTopic {
    pub transcript: Vec<ChatMessage>,
    pub rendered_log: Vec<String>,
}

impl ArchivedTopic {
    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty() && self.rendered_log.is_empty()
    }
}
