//! Topic-based messaging used to propagate feature toggles.
//!
//! [`MessageBus`] is implemented in memory (tests, single-process runs) and,
//! behind the `kafka` feature, on top of rdkafka. [`RetryingConsumer`] adds
//! retry and dead-letter topics on top of any bus.

pub mod bus;
pub mod consumer;
pub mod error;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod memory;
pub mod message;

pub use bus::{MessageBus, MessageStream};
pub use consumer::{
    HandlerError, MessageHandler, RetryPolicy, RetryingConsumer, dead_letter_topic, retry_topic,
};
pub use error::{MessagingError, Result};
#[cfg(feature = "kafka")]
pub use kafka::KafkaMessageBus;
pub use memory::InMemoryMessageBus;
pub use message::Message;

use std::sync::Arc;

/// Picks the bus for a service.
///
/// With the `kafka` feature and a broker list, returns a Kafka bus. Otherwise
/// an in-memory bus, which only reaches subscribers in the same process.
pub fn connect(brokers: Option<&str>) -> Result<Arc<dyn MessageBus>> {
    #[cfg(feature = "kafka")]
    if let Some(brokers) = brokers {
        return Ok(Arc::new(KafkaMessageBus::new(brokers)?));
    }

    if let Some(brokers) = brokers {
        tracing::warn!(
            brokers,
            "built without the `kafka` feature, falling back to the in-memory bus"
        );
    } else {
        tracing::warn!("no Kafka brokers configured, using the in-memory bus");
    }
    Ok(Arc::new(InMemoryMessageBus::new()))
}
