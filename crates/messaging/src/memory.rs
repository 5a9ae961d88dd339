use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};

use crate::{Message, MessageBus, MessageStream, MessagingError, Result};

#[derive(Default)]
struct InMemoryBusState {
    subscribers: HashMap<String, Vec<mpsc::UnboundedSender<Message>>>,
    log: Option<Vec<Message>>,
    fail_on_publish: bool,
}

/// In-process message bus.
///
/// Every subscription receives every message of its topics; consumer groups
/// are not balanced. A bus built with [`InMemoryMessageBus::recording`] also
/// keeps every published message so tests can assert on them.
#[derive(Clone, Default)]
pub struct InMemoryMessageBus {
    state: Arc<RwLock<InMemoryBusState>>,
}

impl InMemoryMessageBus {
    /// Creates a new empty bus that keeps nothing once delivered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus that records every published message.
    pub fn recording() -> Self {
        let state = InMemoryBusState {
            log: Some(Vec::new()),
            ..Default::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Configures the bus to reject publishes.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().await.fail_on_publish = fail;
    }

    /// Messages published to `topic`, oldest first. Empty unless recording.
    pub async fn published(&self, topic: &str) -> Vec<Message> {
        self.state
            .read()
            .await
            .log
            .iter()
            .flatten()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    /// Total number of recorded messages.
    pub async fn published_count(&self) -> usize {
        self.state.read().await.log.as_ref().map_or(0, Vec::len)
    }

    /// Number of live subscriptions on `topic`.
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.state
            .read()
            .await
            .subscribers
            .get(topic)
            .map_or(0, |subs| subs.iter().filter(|tx| !tx.is_closed()).count())
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn publish(&self, message: Message) -> Result<()> {
        let mut state = self.state.write().await;

        if state.fail_on_publish {
            return Err(MessagingError::Publish {
                topic: message.topic,
                reason: "bus unavailable".to_string(),
            });
        }

        if let Some(subscribers) = state.subscribers.get_mut(&message.topic) {
            subscribers.retain(|tx| tx.send(message.clone()).is_ok());
        }
        metrics::counter!("messages_published_total", "topic" => message.topic.clone())
            .increment(1);
        if let Some(log) = state.log.as_mut() {
            log.push(message);
        }
        Ok(())
    }

    async fn subscribe(&self, topics: &[String], group_id: &str) -> Result<MessageStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.write().await;
        for topic in topics {
            state
                .subscribers
                .entry(topic.clone())
                .or_default()
                .push(tx.clone());
        }
        tracing::debug!(?topics, group_id, "in-memory subscription registered");

        let stream = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|message| (Ok(message), rx))
        });
        Ok(Box::pin(stream))
    }
}
