//! Conversation state management module
//!
//! Owns the single in-memory session:
//! - Topic detection and archive rotation on each submission
//! - Outbound request composition (system instruction + recent turns)
//! - Explicit commands for new topic / topic switch / language

mod context_builder;
mod error;
pub mod manager;
pub mod types;

pub use context_builder::{ContextBuilder, SystemContextComponents, MAX_CONTEXT_MESSAGES};
pub use error::ConversationError;
pub use manager::{ConversationManager, LlmProvider};
pub use types::{
    ConversationPhase, PreparedTurn, Session, SessionSnapshot, TopicSummary, TurnOutcome,
};
