use thiserror::Error;

/// Rejections raised before any session state is touched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("A reply is still pending, wait for it before sending more")]
    ReplyPending,

    #[error("No pending reply with request id {0}")]
    NoPendingReply(String),
}
