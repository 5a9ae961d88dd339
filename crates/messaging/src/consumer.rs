//! Retrying consumer with retry and dead-letter topics.
//!
//! A message that fails is republished to `<topic>-retry` after the backoff,
//! carrying its attempt number in the `retry-attempt` header. Once the
//! attempts are exhausted it is published to `<topic>-dlt` instead.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::message::{DLT_EXCEPTION_MESSAGE_HEADER, DLT_ORIGINAL_TOPIC_HEADER, RETRY_ATTEMPT_HEADER};
use crate::{Message, MessageBus, Result};

/// Name of the retry topic for `topic`.
pub fn retry_topic(topic: &str) -> String {
    format!("{topic}-retry")
}

/// Name of the dead-letter topic for `topic`.
pub fn dead_letter_topic(topic: &str) -> String {
    format!("{topic}-dlt")
}

/// How many times a message is delivered and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total deliveries, the first one included.
    pub attempts: u32,
    /// Fixed delay before each redelivery.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(3000),
        }
    }
}

/// Failure reported by a [`MessageHandler`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self(format!("undecodable payload: {err}"))
    }
}

/// Processes one consumed message.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &Message) -> std::result::Result<(), HandlerError>;
}

/// Drives a [`MessageHandler`] from a topic and its retry topic.
pub struct RetryingConsumer {
    bus: Arc<dyn MessageBus>,
    topic: String,
    group_id: String,
    policy: RetryPolicy,
}

impl RetryingConsumer {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        topic: impl Into<String>,
        group_id: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            bus,
            topic: topic.into(),
            group_id: group_id.into(),
            policy,
        }
    }

    /// Subscribes and spawns the consume loop.
    ///
    /// The subscription is in place when this returns, so messages published
    /// afterwards are not missed.
    pub async fn start(self, handler: Arc<dyn MessageHandler>) -> Result<JoinHandle<()>> {
        let topics = vec![self.topic.clone(), retry_topic(&self.topic)];
        let mut stream = self.bus.subscribe(&topics, &self.group_id).await?;
        tracing::info!(
            topic = %self.topic,
            group_id = %self.group_id,
            attempts = self.policy.attempts,
            backoff_ms = self.policy.backoff.as_millis() as u64,
            "consumer started"
        );

        Ok(tokio::spawn(async move {
            while let Some(next) = stream.next().await {
                match next {
                    Ok(message) => self.dispatch(handler.as_ref(), message).await,
                    Err(err) => tracing::error!(error = %err, topic = %self.topic, "consume failed"),
                }
            }
            tracing::info!(topic = %self.topic, "consumer stream ended");
        }))
    }

    async fn dispatch(&self, handler: &dyn MessageHandler, message: Message) {
        let attempt = message.attempt();

        let err = match handler.handle(&message).await {
            Ok(()) => return,
            Err(err) => err,
        };

        if attempt < self.policy.attempts {
            tracing::warn!(
                topic = %self.topic,
                key = ?message.key,
                attempt,
                error = %err,
                "message handling failed, scheduling retry"
            );
            metrics::counter!("messages_retried_total", "topic" => self.topic.clone())
                .increment(1);

            let retry = message
                .redirect(retry_topic(&self.topic))
                .with_header(RETRY_ATTEMPT_HEADER, (attempt + 1).to_string());
            let bus = self.bus.clone();
            let backoff = self.policy.backoff;
            tokio::spawn(async move {
                tokio::time::sleep(backoff).await;
                if let Err(err) = bus.publish(retry).await {
                    tracing::error!(error = %err, "failed to publish retry message");
                }
            });
        } else {
            tracing::error!(
                topic = %self.topic,
                key = ?message.key,
                attempt,
                error = %err,
                "retries exhausted, dead-lettering message"
            );
            metrics::counter!("messages_dead_lettered_total", "topic" => self.topic.clone())
                .increment(1);

            let dead_letter = message
                .redirect(dead_letter_topic(&self.topic))
                .with_header(DLT_ORIGINAL_TOPIC_HEADER, self.topic.clone())
                .with_header(DLT_EXCEPTION_MESSAGE_HEADER, err.to_string());
            if let Err(err) = self.bus.publish(dead_letter).await {
                tracing::error!(error = %err, "failed to publish dead-letter message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::InMemoryMessageBus;

    struct FlakyHandler {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    impl FlakyHandler {
        fn failing(times: u32) -> Arc<Self> {
            Arc::new(Self {
                failures_left: AtomicU32::new(times),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl MessageHandler for FlakyHandler {
        async fn handle(&self, _message: &Message) -> std::result::Result<(), HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(HandlerError::new("boom"));
            }
            Ok(())
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            backoff: Duration::from_millis(10),
        }
    }

    async fn start(bus: &InMemoryMessageBus, handler: Arc<FlakyHandler>) {
        RetryingConsumer::new(Arc::new(bus.clone()), "toggles", "group", fast_policy())
            .start(handler)
            .await
            .unwrap();
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    #[tokio::test]
    async fn successful_message_is_handled_once() {
        let bus = InMemoryMessageBus::recording();
        let handler = FlakyHandler::failing(0);
        start(&bus, handler.clone()).await;

        bus.publish(Message::new("toggles", None, b"{}".to_vec())).await.unwrap();
        settle().await;

        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
        assert!(bus.published("toggles-retry").await.is_empty());
        assert!(bus.published("toggles-dlt").await.is_empty());
    }

    #[tokio::test]
    async fn transient_failure_is_retried_until_success() {
        let bus = InMemoryMessageBus::recording();
        let handler = FlakyHandler::failing(2);
        start(&bus, handler.clone()).await;

        bus.publish(Message::new("toggles", None, b"{}".to_vec())).await.unwrap();
        settle().await;

        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
        let retries = bus.published("toggles-retry").await;
        assert_eq!(retries.len(), 2);
        assert_eq!(retries[0].attempt(), 2);
        assert_eq!(retries[1].attempt(), 3);
        assert!(bus.published("toggles-dlt").await.is_empty());
    }

    #[tokio::test]
    async fn exhausted_message_goes_to_dead_letter_topic() {
        let bus = InMemoryMessageBus::recording();
        let handler = FlakyHandler::failing(u32::MAX);
        start(&bus, handler.clone()).await;

        bus.publish(Message::new("toggles", Some("k".into()), b"{}".to_vec()))
            .await
            .unwrap();
        settle().await;

        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
        let dead = bus.published("toggles-dlt").await;
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].key.as_deref(), Some("k"));
        assert_eq!(dead[0].header(DLT_ORIGINAL_TOPIC_HEADER), Some("toggles"));
        assert_eq!(dead[0].header(DLT_EXCEPTION_MESSAGE_HEADER), Some("boom"));
    }

    #[test]
    fn default_policy_is_three_attempts_three_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.backoff, Duration::from_secs(3));
    }
}
