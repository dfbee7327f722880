//! Topic segmentation
//!
//! - Lexical normalization of utterances
//! - Heuristic new-topic detection
//! - Archive of abandoned topics for later restore

pub mod detector;
pub mod store;
pub mod tokenizer;
pub mod types;

pub use detector::{TopicDecision, TopicDetector, TOPIC_CHANGE_INDICATORS};
pub use store::{render_error, render_exchange, TopicStore};
pub use tokenizer::normalize;
pub use types::{ArchivedTopic, TopicThresholds};
