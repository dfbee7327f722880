use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity type categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    SessionCreated,
    RequestReceived,    // Utterance accepted
    RequestRejected,    // Empty input or reply pending
    TopicDetected,
    TopicArchived,
    TopicSwitched,
    TopicCleared,
    ReplyReceived,
    LlmError,
    RequestCancelled,
    LanguageChanged,
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SessionCreated => "session_created",
            Self::RequestReceived => "request_received",
            Self::RequestRejected => "request_rejected",
            Self::TopicDetected => "topic_detected",
            Self::TopicArchived => "topic_archived",
            Self::TopicSwitched => "topic_switched",
            Self::TopicCleared => "topic_cleared",
            Self::ReplyReceived => "reply_received",
            Self::LlmError => "llm_error",
            Self::RequestCancelled => "request_cancelled",
            Self::LanguageChanged => "language_changed",
        }
    }
}

/// Activity status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    Error,
    Warning,
    Info,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Complete activity log entry
#[derive(Debug, Clone)]
pub struct ActivityLog {
    pub activity_type: ActivityType,
    pub activity_status: ActivityStatus,

    // Context
    pub request_id: Option<String>,
    pub topic: Option<String>,
    pub message_content: Option<String>,
    pub detail: Option<String>,

    // Performance
    pub llm_call_duration_ms: Option<u64>,

    // Error
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    /// Create builder for fluent API
    pub fn builder(activity_type: ActivityType) -> ActivityLogBuilder {
        ActivityLogBuilder::new(activity_type)
    }
}

/// Builder pattern for ActivityLog
pub struct ActivityLogBuilder {
    log: ActivityLog,
}

impl ActivityLogBuilder {
    pub fn new(activity_type: ActivityType) -> Self {
        Self {
            log: ActivityLog {
                activity_type,
                activity_status: ActivityStatus::Success,
                request_id: None,
                topic: None,
                message_content: None,
                detail: None,
                llm_call_duration_ms: None,
                error_message: None,
                created_at: Utc::now(),
            },
        }
    }

    pub fn status(mut self, status: ActivityStatus) -> Self {
        self.log.activity_status = status;
        self
    }

    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.log.request_id = Some(id.into());
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.log.topic = Some(topic.into());
        self
    }

    pub fn message(mut self, content: impl Into<String>) -> Self {
        self.log.message_content = Some(content.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.log.detail = Some(detail.into());
        self
    }

    pub fn llm_duration(mut self, ms: u64) -> Self {
        self.log.llm_call_duration_ms = Some(ms);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.log.error_message = Some(message.into());
        self.log.activity_status = ActivityStatus::Error;
        self
    }

    pub fn build(self) -> ActivityLog {
        self.log
    }
}
