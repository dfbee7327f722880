use anyhow::Result;
use parking_lot::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::logging::{ActivityLog, ActivityLogger, ActivityStatus, ActivityType};
use crate::models::chat::{ChatMessage, Language};
use crate::services::topic::{render_error, render_exchange, TopicDetector, TopicThresholds};

use super::context_builder::ContextBuilder;
use super::error::ConversationError;
use super::types::{PendingTurn, PreparedTurn, Session, SessionSnapshot, TopicSummary, TurnOutcome};

/// Recorded in place of a reply when the caller drops a pending submission
const CANCELLED_MESSAGE: &str = "request cancelled";

/// Trait for the text-completion collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Owns the single conversation session.
///
/// Commands lock the session only for their synchronous part; the provider
/// call of `submit` runs unlocked while the session sits in the
/// awaiting-reply state, during which every other command is rejected.
pub struct ConversationManager {
    session: Mutex<Session>,
    detector: TopicDetector,
    context_builder: ContextBuilder,
    llm_provider: Box<dyn LlmProvider>,
    logger: ActivityLogger,
}

impl ConversationManager {
    pub fn new(
        llm_provider: Box<dyn LlmProvider>,
        logger: ActivityLogger,
        thresholds: TopicThresholds,
        system_prompt: String,
    ) -> Self {
        logger.log(
            ActivityLog::builder(ActivityType::SessionCreated)
                .status(ActivityStatus::Info)
                .build(),
        );

        Self {
            session: Mutex::new(Session::new()),
            detector: TopicDetector::new(thresholds),
            context_builder: ContextBuilder::new(system_prompt),
            llm_provider,
            logger,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot()
    }

    pub fn topics(&self) -> Vec<TopicSummary> {
        self.session.lock().topic_summaries()
    }

    pub fn current_topic(&self) -> Option<String> {
        self.session.lock().current_topic.clone()
    }

    /// Run one full exchange: detect, rotate, call the provider once, record
    /// the outcome. Provider failures end up in the rendered log, never here.
    pub async fn submit(&self, utterance: &str) -> Result<TurnOutcome, ConversationError> {
        let prepared = self.prepare_turn(utterance)?;

        let guard = PendingGuard {
            manager: self,
            request_id: &prepared.request_id,
            armed: true,
        };

        let started = Instant::now();
        let reply = self.llm_provider.generate(&prepared.messages).await;
        let llm_ms = started.elapsed().as_millis() as u64;
        guard.disarm();

        debug!("Completion for {} finished in {}ms", prepared.request_id, llm_ms);

        let snapshot = self.finish_turn(&prepared.request_id, reply, Some(llm_ms))?;

        Ok(TurnOutcome {
            decision: prepared.decision,
            messages: prepared.messages,
            snapshot,
        })
    }

    /// Synchronous half of `submit`: validate, detect the topic, rotate the
    /// archive if needed, append the user turn and compose the request.
    /// The session stays awaiting a reply until `complete_turn`.
    pub fn prepare_turn(&self, utterance: &str) -> Result<PreparedTurn, ConversationError> {
        if utterance.trim().is_empty() {
            self.log_rejected("empty input");
            return Err(ConversationError::EmptyInput);
        }

        let mut session = self.session.lock();
        if session.is_awaiting_reply() {
            self.log_rejected("reply pending");
            return Err(ConversationError::ReplyPending);
        }

        let decision = self.detector.decide(
            utterance,
            session.current_topic.as_deref(),
            &session.transcript,
            session.first_message,
        );
        let new_topic = decision.is_new_topic();

        session.query_history.insert(0, utterance.to_string());

        if new_topic {
            let had_topic = session
                .current_topic
                .as_deref()
                .is_some_and(|label| !label.is_empty());

            if let Some(label) = session.archive_current() {
                self.log_archived(&label);
            }

            session.current_topic = Some(utterance.to_string());
            session.topic_changed = had_topic;
            session.first_message = false;

            info!("New topic opened: {:?}", decision);
            self.logger.log(
                ActivityLog::builder(ActivityType::TopicDetected)
                    .topic(utterance)
                    .detail(format!("{:?}", decision))
                    .build(),
            );
        }

        let prior_turns = session.transcript.len();
        let current_topic = session.current_topic.clone().unwrap_or_default();
        session.transcript.push(ChatMessage::user(utterance));

        let system_instruction = self.context_builder.build_system_instruction(
            session.language,
            new_topic,
            utterance,
            &current_topic,
            prior_turns,
        );
        let messages = self
            .context_builder
            .build_request(system_instruction, &session.transcript);

        let request_id = Uuid::new_v4().to_string();
        session.pending = Some(PendingTurn {
            request_id: request_id.clone(),
            utterance: utterance.to_string(),
        });

        self.logger.log(
            ActivityLog::builder(ActivityType::RequestReceived)
                .status(ActivityStatus::Info)
                .request_id(&request_id)
                .topic(&current_topic)
                .message(utterance)
                .detail(format!("{} messages", messages.len()))
                .build(),
        );

        Ok(PreparedTurn {
            request_id,
            decision,
            messages,
        })
    }

    /// Record the provider outcome of a prepared turn.
    /// A failure adds only an error entry; the user turn stays unanswered.
    pub fn complete_turn(
        &self,
        request_id: &str,
        reply: Result<String>,
    ) -> Result<SessionSnapshot, ConversationError> {
        self.finish_turn(request_id, reply, None)
    }

    fn finish_turn(
        &self,
        request_id: &str,
        reply: Result<String>,
        llm_ms: Option<u64>,
    ) -> Result<SessionSnapshot, ConversationError> {
        let mut session = self.session.lock();

        let pending = match session.pending.take() {
            Some(pending) if pending.request_id == request_id => pending,
            other => {
                session.pending = other;
                return Err(ConversationError::NoPendingReply(request_id.to_string()));
            }
        };

        let topic = session.current_topic.clone().unwrap_or_default();

        match reply {
            Ok(reply) => {
                session
                    .rendered_log
                    .push(render_exchange(&pending.utterance, &reply));
                session.transcript.push(ChatMessage::assistant(reply));
                session.topic_changed = false;

                let mut log = ActivityLog::builder(ActivityType::ReplyReceived)
                    .request_id(request_id)
                    .topic(topic);
                if let Some(ms) = llm_ms {
                    log = log.llm_duration(ms);
                }
                self.logger.log(log.build());
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!("Completion for {} failed: {}", request_id, message);
                session.rendered_log.push(render_error(&message));

                self.logger.log(
                    ActivityLog::builder(ActivityType::LlmError)
                        .request_id(request_id)
                        .topic(topic)
                        .error(message)
                        .build(),
                );
            }
        }

        Ok(session.snapshot())
    }

    /// Archive the open topic and return to idle
    pub fn start_new_topic(&self) -> Result<SessionSnapshot, ConversationError> {
        let mut session = self.session.lock();
        if session.is_awaiting_reply() {
            self.log_rejected("reply pending");
            return Err(ConversationError::ReplyPending);
        }

        if let Some(label) = session.archive_current() {
            self.log_archived(&label);
        }
        session.first_message = true;
        session.topic_changed = false;

        info!("Topic cleared, session idle");
        self.logger.log(ActivityLog::builder(ActivityType::TopicCleared).build());

        Ok(session.snapshot())
    }

    /// Archive the open topic and load `label` from the archive.
    /// An unknown label opens with an empty transcript.
    pub fn switch_to_topic(&self, label: &str) -> Result<SessionSnapshot, ConversationError> {
        let mut session = self.session.lock();
        if session.is_awaiting_reply() {
            self.log_rejected("reply pending");
            return Err(ConversationError::ReplyPending);
        }

        if let Some(archived) = session.archive_current() {
            self.log_archived(&archived);
        }

        let restored = session.store.restore(label);
        let hit = !restored.is_empty();

        session.current_topic = (!label.is_empty()).then(|| label.to_string());
        session.transcript = restored.transcript;
        session.rendered_log = restored.rendered_log;

        info!(
            "Switched to topic '{}' ({} turns restored)",
            label,
            session.transcript.len()
        );
        self.logger.log(
            ActivityLog::builder(ActivityType::TopicSwitched)
                .topic(label)
                .detail(if hit { "restored" } else { "empty" })
                .build(),
        );

        Ok(session.snapshot())
    }

    pub fn set_language(&self, language: Language) -> Result<SessionSnapshot, ConversationError> {
        let mut session = self.session.lock();
        if session.is_awaiting_reply() {
            self.log_rejected("reply pending");
            return Err(ConversationError::ReplyPending);
        }

        session.language = language;
        self.logger.log(
            ActivityLog::builder(ActivityType::LanguageChanged)
                .detail(language.directive())
                .build(),
        );

        Ok(session.snapshot())
    }

    pub fn logger(&self) -> &ActivityLogger {
        &self.logger
    }

    fn log_archived(&self, label: &str) {
        debug!("Topic '{}' archived", label);
        self.logger.log(
            ActivityLog::builder(ActivityType::TopicArchived)
                .topic(label)
                .build(),
        );
    }

    fn log_rejected(&self, reason: &str) {
        self.logger.log(
            ActivityLog::builder(ActivityType::RequestRejected)
                .status(ActivityStatus::Warning)
                .detail(reason)
                .build(),
        );
    }
}

/// Completes the pending turn as cancelled if `submit` is dropped mid-call
struct PendingGuard<'a> {
    manager: &'a ConversationManager,
    request_id: &'a str,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        warn!("Submission {} dropped while awaiting reply", self.request_id);
        self.manager.logger.log(
            ActivityLog::builder(ActivityType::RequestCancelled)
                .status(ActivityStatus::Warning)
                .request_id(self.request_id)
                .build(),
        );
        let _ = self
            .manager
            .complete_turn(self.request_id, Err(anyhow::anyhow!(CANCELLED_MESSAGE)));
    }
}
