/// Topic Change Detector
/// Decides whether a new utterance continues the current topic or opens a
/// new one, using shallow lexical overlap. Best effort, not a classifier.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::models::chat::ChatMessage;
use super::tokenizer::{normalize, normalize_all};
use super::types::TopicThresholds;

/// Openers that always announce a new topic (matched case-insensitively)
pub const TOPIC_CHANGE_INDICATORS: &[&str] = &[
    "let's talk about",
    "can we discuss",
    "i want to ask about",
    "tell me about",
    "what do you think about",
    "new topic:",
    "switch to",
    "changing the subject",
    "moving on to",
];

/// Outcome of topic detection, naming the rule that fired
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum TopicDecision {
    FirstMessage,
    NoCurrentTopic,
    IndicatorPhrase { phrase: String },
    LowOverlap { topic_ratio: f64, recent_ratio: f64 },
    LengthShift { utterance_len: usize, topic_len: usize },
    UnanchoredQuestion { topic_ratio: f64 },
    Continuation,
}

impl TopicDecision {
    pub fn is_new_topic(&self) -> bool {
        !matches!(self, Self::Continuation)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TopicDetector {
    thresholds: TopicThresholds,
}

impl TopicDetector {
    pub fn new(thresholds: TopicThresholds) -> Self {
        Self { thresholds }
    }

    pub fn is_new_topic(
        &self,
        utterance: &str,
        current_topic: Option<&str>,
        recent_turns: &[ChatMessage],
        is_first_message: bool,
    ) -> bool {
        self.decide(utterance, current_topic, recent_turns, is_first_message)
            .is_new_topic()
    }

    /// Rules are checked in order, the first match wins.
    pub fn decide(
        &self,
        utterance: &str,
        current_topic: Option<&str>,
        recent_turns: &[ChatMessage],
        is_first_message: bool,
    ) -> TopicDecision {
        if is_first_message {
            debug!("First message of the session, opening a topic");
            return TopicDecision::FirstMessage;
        }

        let topic = match current_topic {
            Some(topic) if !topic.is_empty() => topic,
            _ => {
                debug!("No current topic, opening a topic");
                return TopicDecision::NoCurrentTopic;
            }
        };

        let lower = utterance.to_lowercase();
        if let Some(phrase) = TOPIC_CHANGE_INDICATORS
            .iter()
            .find(|phrase| lower.starts_with(*phrase))
        {
            debug!("Topic change indicator matched: '{}'", phrase);
            return TopicDecision::IndicatorPhrase { phrase: phrase.to_string() };
        }

        let t = &self.thresholds;

        let topic_tokens = normalize(topic);
        let window_start = recent_turns.len().saturating_sub(t.recent_window);
        let recent_tokens = normalize_all(
            recent_turns[window_start..].iter().map(|turn| turn.content.as_str()),
        );
        let new_tokens = normalize(utterance);

        let topic_ratio = overlap_ratio(&new_tokens, &topic_tokens);
        let recent_ratio = overlap_ratio(&new_tokens, &recent_tokens);
        let enough_tokens = new_tokens.len() >= t.min_token_count;

        debug!(
            "Overlap: tokens={}, topic_ratio={:?}, recent_ratio={:?}",
            new_tokens.len(),
            topic_ratio,
            recent_ratio
        );

        if enough_tokens {
            if let (Some(topic_ratio), Some(recent_ratio)) = (topic_ratio, recent_ratio) {
                if topic_ratio < t.overlap_threshold && recent_ratio < t.overlap_threshold {
                    return TopicDecision::LowOverlap { topic_ratio, recent_ratio };
                }
            }
        }

        let utterance_len = utterance.chars().count();
        let topic_len = topic.chars().count();
        if utterance_len > topic_len.saturating_mul(t.length_factor) && utterance_len > t.min_shift_length {
            return TopicDecision::LengthShift { utterance_len, topic_len };
        }

        if lower.contains('?') && enough_tokens {
            if let Some(topic_ratio) = topic_ratio {
                if topic_ratio < t.question_overlap_threshold {
                    return TopicDecision::UnanchoredQuestion { topic_ratio };
                }
            }
        }

        TopicDecision::Continuation
    }
}

/// Share of `tokens` also found in `reference`; `None` when `tokens` is empty.
fn overlap_ratio(tokens: &HashSet<String>, reference: &HashSet<String>) -> Option<f64> {
    if tokens.is_empty() {
        return None;
    }
    let shared = tokens.iter().filter(|token| reference.contains(*token)).count();
    Some(shared as f64 / tokens.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> TopicDetector {
        TopicDetector::default()
    }

    fn rome_history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::user("the history of Rome"),
            ChatMessage::assistant(
                "Rome grew from a city into an empire, and the Roman legions were central to it.",
            ),
        ]
    }

    #[test]
    fn test_first_message_always_new() {
        let d = detector();
        for utterance in ["", "rome", "the history of Rome", "what about the Roman legions"] {
            assert_eq!(
                d.decide(utterance, Some("the history of Rome"), &rome_history(), true),
                TopicDecision::FirstMessage
            );
        }
    }

    #[test]
    fn test_missing_topic_is_new() {
        let d = detector();
        assert_eq!(d.decide("hello", None, &[], false), TopicDecision::NoCurrentTopic);
        assert_eq!(d.decide("hello", Some(""), &[], false), TopicDecision::NoCurrentTopic);
    }

    #[test]
    fn test_indicator_wins_over_overlap() {
        let d = detector();
        let decision = d.decide(
            "Tell me about the history of Rome",
            Some("the history of Rome"),
            &rome_history(),
            false,
        );
        assert_eq!(
            decision,
            TopicDecision::IndicatorPhrase { phrase: "tell me about".to_string() }
        );
    }

    #[test]
    fn test_indicator_case_insensitive() {
        let d = detector();
        for phrase in TOPIC_CHANGE_INDICATORS {
            let utterance = format!("{} rome", phrase.to_uppercase());
            assert!(d.is_new_topic(&utterance, Some("rome"), &[], false), "{}", utterance);
        }
    }

    #[test]
    fn test_indicator_only_at_start() {
        let d = detector();
        assert!(!d.is_new_topic("so tell me about rome", Some("rome history"), &[], false));
    }

    #[test]
    fn test_scenario_weather_to_cars() {
        let d = detector();
        let decision = d.decide("let's talk about cars", Some("weather today"), &[], false);
        assert_eq!(
            decision,
            TopicDecision::IndicatorPhrase { phrase: "let's talk about".to_string() }
        );
    }

    #[test]
    fn test_scenario_roman_legions_continues() {
        let d = detector();
        let decision = d.decide(
            "what about the Roman legions",
            Some("the history of Rome"),
            &rome_history(),
            false,
        );
        assert_eq!(decision, TopicDecision::Continuation);
    }

    #[test]
    fn test_comma_joined_recent_turn_gives_no_overlap() {
        let d = detector();
        // Commas are stripped, not split on: "Rome,empire,legion" is one token
        let turns = vec![ChatMessage::assistant("Rome,empire,legion")];
        let decision = d.decide(
            "what about the Roman legions",
            Some("the history of Rome"),
            &turns,
            false,
        );
        assert_eq!(
            decision,
            TopicDecision::LowOverlap { topic_ratio: 0.0, recent_ratio: 0.0 }
        );
    }

    #[test]
    fn test_huge_length_factor_does_not_overflow() {
        let d = TopicDetector::new(TopicThresholds {
            length_factor: usize::MAX,
            ..TopicThresholds::default()
        });
        let utterance = "rome ".repeat(20);
        assert!(!d.is_new_topic(&utterance, Some("rome"), &[], false));
    }

    #[test]
    fn test_low_overlap_is_new() {
        let d = detector();
        let decision = d.decide(
            "recommend some good pasta recipes",
            Some("the history of Rome"),
            &rome_history(),
            false,
        );
        match decision {
            TopicDecision::LowOverlap { topic_ratio, recent_ratio } => {
                assert_eq!(topic_ratio, 0.0);
                assert_eq!(recent_ratio, 0.0);
            }
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn test_recent_window_is_last_four_turns() {
        let d = detector();
        let mut turns = vec![ChatMessage::user("pasta recipes cooking")];
        for _ in 0..4 {
            turns.push(ChatMessage::assistant("nothing related here"));
        }
        // The only overlapping turn fell out of the window
        assert!(d.is_new_topic("pasta recipes cooking tonight", Some("history"), &turns, false));
        turns.truncate(4);
        assert!(!d.is_new_topic("pasta recipes cooking tonight", Some("history"), &turns, false));
    }

    #[test]
    fn test_short_utterance_skips_overlap_rule() {
        let d = detector();
        // Two tokens only, below the minimum for the overlap rule
        assert!(!d.is_new_topic("pasta recipes", Some("the history of Rome"), &[], false));
    }

    #[test]
    fn test_empty_token_set_never_divides() {
        let d = detector();
        assert_eq!(
            d.decide("a b c ?", Some("the history of Rome"), &[], false),
            TopicDecision::Continuation
        );
    }

    #[test]
    fn test_length_shift() {
        let d = detector();
        let utterance = "rome rome rome rome rome rome rome rome rome rome rome rome";
        let decision = d.decide(utterance, Some("rome"), &[], false);
        assert_eq!(
            decision,
            TopicDecision::LengthShift { utterance_len: utterance.len(), topic_len: 4 }
        );
    }

    #[test]
    fn test_length_shift_needs_minimum_length() {
        let d = detector();
        // Far longer than the label but not above 50 characters
        assert!(!d.is_new_topic("rome rome rome rome rome", Some("rome"), &[], false));
    }

    #[test]
    fn test_unanchored_question() {
        let d = detector();
        let turns = vec![ChatMessage::assistant("senate consuls emperors")];
        let decision = d.decide(
            "were senate consuls elected?",
            Some("the history of Rome"),
            &turns,
            false,
        );
        assert_eq!(decision, TopicDecision::UnanchoredQuestion { topic_ratio: 0.0 });
    }

    #[test]
    fn test_decision_is_deterministic() {
        let d = detector();
        let a = d.decide("what about the Roman legions", Some("the history of Rome"), &rome_history(), false);
        let b = d.decide("what about the Roman legions", Some("the history of Rome"), &rome_history(), false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_decision_serializes_rule_tag() {
        let json = serde_json::to_value(TopicDecision::IndicatorPhrase {
            phrase: "switch to".to_string(),
        })
        .unwrap();
        assert_eq!(json["rule"], "indicator_phrase");
        assert_eq!(json["phrase"], "switch to");
    }
}
