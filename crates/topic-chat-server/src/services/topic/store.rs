use std::collections::HashMap;

use tracing::debug;

use crate::models::chat::ChatMessage;
use super::types::ArchivedTopic;

/// Display form of one answered exchange
pub fn render_exchange(user: &str, reply: &str) -> String {
    format!("You: {}\n\nAI: {}", user, reply)
}

/// Display form of a failed exchange
pub fn render_error(message: &str) -> String {
    format!("Error: {}", message)
}

/// In-memory archive of abandoned topics.
/// Labels are kept most-recent-first and never duplicated; entries are only
/// overwritten, never removed.
#[derive(Debug, Clone, Default)]
pub struct TopicStore {
    order: Vec<String>,
    archive: HashMap<String, ArchivedTopic>,
}

impl TopicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a topic being abandoned. Unlabeled or empty topics are ignored.
    /// Returns whether anything was written.
    pub fn archive_current(
        &mut self,
        label: &str,
        transcript: &[ChatMessage],
        rendered_log: &[String],
    ) -> bool {
        if label.is_empty() || transcript.is_empty() {
            return false;
        }

        self.archive.insert(
            label.to_string(),
            ArchivedTopic {
                transcript: transcript.to_vec(),
                rendered_log: rendered_log.to_vec(),
            },
        );

        if !self.order.iter().any(|known| known == label) {
            self.order.insert(0, label.to_string());
        }

        debug!(
            "Archived topic '{}' ({} turns, {} entries)",
            label,
            transcript.len(),
            rendered_log.len()
        );
        true
    }

    /// Saved state of `label`, or an empty topic when nothing was saved.
    /// A saved transcript without rendered entries gets its entries rebuilt.
    pub fn restore(&self, label: &str) -> ArchivedTopic {
        let Some(saved) = self.archive.get(label) else {
            debug!("No archive for topic '{}', restoring empty state", label);
            return ArchivedTopic::default();
        };

        if !saved.rendered_log.is_empty() {
            return saved.clone();
        }

        if saved.transcript.is_empty() {
            return ArchivedTopic::default();
        }

        ArchivedTopic {
            transcript: saved.transcript.clone(),
            rendered_log: reconstruct_rendered_log(&saved.transcript),
        }
    }

    pub fn list_topics(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, label: &str) -> bool {
        self.archive.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Pair turns positionally: (0,1), (2,3), ... A trailing odd turn is dropped.
fn reconstruct_rendered_log(transcript: &[ChatMessage]) -> Vec<String> {
    transcript
        .chunks_exact(2)
        .map(|pair| render_exchange(&pair[0].content, &pair[1].content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("question {}", i / 2))
                } else {
                    ChatMessage::assistant(format!("answer {}", i / 2))
                }
            })
            .collect()
    }

    #[test]
    fn test_archive_and_restore_round_trip() {
        let mut store = TopicStore::new();
        let t = transcript(4);
        let r = vec![render_exchange("question 0", "answer 0"), "Error: boom".to_string()];

        assert!(store.archive_current("rome", &t, &r));
        let restored = store.restore("rome");
        assert_eq!(restored.transcript, t);
        assert_eq!(restored.rendered_log, r);
    }

    #[test]
    fn test_reconstructs_missing_rendered_log() {
        let mut store = TopicStore::new();
        store.archive_current("rome", &transcript(5), &[]);

        let restored = store.restore("rome");
        assert_eq!(restored.transcript.len(), 5);
        assert_eq!(
            restored.rendered_log,
            vec![
                "You: question 0\n\nAI: answer 0".to_string(),
                "You: question 1\n\nAI: answer 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_reconstruction_length_is_half_transcript() {
        for n in 1..8 {
            let mut store = TopicStore::new();
            store.archive_current("topic", &transcript(n), &[]);
            assert_eq!(store.restore("topic").rendered_log.len(), n / 2);
        }
    }

    #[test]
    fn test_restore_miss_is_empty() {
        let store = TopicStore::new();
        assert!(store.restore("unknown").is_empty());
    }

    #[test]
    fn test_ignores_empty_label_or_transcript() {
        let mut store = TopicStore::new();
        assert!(!store.archive_current("", &transcript(2), &[]));
        assert!(!store.archive_current("rome", &[], &["x".to_string()]));
        assert!(store.is_empty());
        assert!(!store.contains("rome"));
    }

    #[test]
    fn test_order_is_most_recent_first_without_duplicates() {
        let mut store = TopicStore::new();
        store.archive_current("a", &transcript(2), &[]);
        store.archive_current("b", &transcript(2), &[]);
        store.archive_current("a", &transcript(4), &[]);

        assert_eq!(store.list_topics().to_vec(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(store.len(), 2);
        // Overwritten with the later save
        assert_eq!(store.restore("a").transcript.len(), 4);
    }

    #[test]
    fn test_list_topics_is_stable() {
        let mut store = TopicStore::new();
        store.archive_current("a", &transcript(2), &[]);
        store.archive_current("b", &transcript(2), &[]);
        assert_eq!(store.list_topics().to_vec(), store.list_topics().to_vec());
    }
}
