use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{Message, Result};

/// A stream of consumed messages.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// Publish/subscribe over named topics.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publishes a message to `message.topic`.
    async fn publish(&self, message: Message) -> Result<()>;

    /// Subscribes to every topic in `topics` as member of `group_id`.
    ///
    /// Messages published after this call returns are delivered on the stream.
    async fn subscribe(&self, topics: &[String], group_id: &str) -> Result<MessageStream>;
}
