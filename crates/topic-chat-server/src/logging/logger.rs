use flume::{bounded, Receiver, Sender};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::types::{ActivityLog, ActivityStatus};

/// Logger configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Queue capacity (max logs in memory before dropping)
    pub queue_capacity: usize,

    /// Max logs emitted per batch
    pub batch_size: usize,

    /// Max wait time before flushing batch (milliseconds)
    pub batch_timeout_ms: u64,

    /// Number of worker tasks draining the queue
    pub worker_count: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1_000,
            batch_size: 50,
            batch_timeout_ms: 500,
            worker_count: 1,
        }
    }
}

/// Async activity logger with queue mechanism.
/// Entries are emitted as structured `tracing` events on the `activity` target.
#[derive(Clone)]
pub struct ActivityLogger {
    sender: Sender<ActivityLog>,
    // Keeps the channel connected when no worker holds a receiver
    _receiver: Receiver<ActivityLog>,
    dropped: Arc<AtomicU64>,
}

impl ActivityLogger {
    /// Initialize logger with background workers (needs a tokio runtime when
    /// `worker_count > 0`)
    pub fn new(config: LoggerConfig) -> Self {
        let (sender, receiver) = bounded(config.queue_capacity);

        info!(
            "Initializing ActivityLogger: queue={}, batch={}, timeout={}ms, workers={}",
            config.queue_capacity,
            config.batch_size,
            config.batch_timeout_ms,
            config.worker_count
        );

        for worker_id in 0..config.worker_count {
            let receiver = receiver.clone();
            let config = config.clone();

            tokio::spawn(async move {
                Self::worker_loop(worker_id, receiver, config).await;
            });
        }

        Self {
            sender,
            _receiver: receiver,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Log activity (non-blocking, fire-and-forget)
    pub fn log(&self, activity: ActivityLog) {
        if let Err(e) = self.sender.try_send(activity) {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!("Failed to enqueue activity log: {} (dropped so far: {})", e, dropped);
        }
    }

    /// Worker loop - drains logs in batches
    async fn worker_loop(worker_id: usize, receiver: Receiver<ActivityLog>, config: LoggerConfig) {
        debug!("Activity worker {} started", worker_id);

        let mut batch: Vec<ActivityLog> = Vec::with_capacity(config.batch_size);
        let batch_timeout = Duration::from_millis(config.batch_timeout_ms);

        loop {
            let deadline = tokio::time::Instant::now() + batch_timeout;

            while batch.len() < config.batch_size {
                match tokio::time::timeout_at(deadline, receiver.recv_async()).await {
                    Ok(Ok(log)) => batch.push(log),
                    Ok(Err(_)) => {
                        // Channel closed, flush and exit
                        Self::flush_batch(&batch);
                        debug!("Activity worker {} shutting down (channel closed)", worker_id);
                        return;
                    }
                    Err(_) => break,
                }
            }

            if !batch.is_empty() {
                Self::flush_batch(&batch);
                batch.clear();
            } else {
                sleep(Duration::from_millis(100)).await;
            }
        }
    }

    fn flush_batch(batch: &[ActivityLog]) {
        for log in batch {
            Self::emit(log);
        }
    }

    fn emit(log: &ActivityLog) {
        let activity = log.activity_type.as_str();
        let request_id = log.request_id.as_deref().unwrap_or("-");
        let topic = log.topic.as_deref().unwrap_or("-");
        let message = log.message_content.as_deref().unwrap_or("");
        let detail = log.detail.as_deref().unwrap_or("");
        let at = log.created_at.to_rfc3339();

        match log.activity_status {
            ActivityStatus::Error => error!(
                target: "activity",
                activity,
                request_id,
                topic,
                at = %at,
                error_message = log.error_message.as_deref().unwrap_or(""),
                "{}",
                message
            ),
            ActivityStatus::Warning => warn!(
                target: "activity",
                activity,
                request_id,
                topic,
                detail,
                at = %at,
                "{}",
                message
            ),
            ActivityStatus::Success | ActivityStatus::Info => info!(
                target: "activity",
                activity,
                status = log.activity_status.as_str(),
                request_id,
                topic,
                detail,
                llm_ms = log.llm_call_duration_ms.unwrap_or(0),
                at = %at,
                "{}",
                message
            ),
        }
    }

    /// Get queue statistics (for monitoring)
    pub fn queue_len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_queue_full(&self) -> bool {
        self.sender.is_full()
    }

    /// Entries lost because the queue was full
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
