use thiserror::Error;

/// Errors raised by message bus implementations.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The bus refused or failed to deliver a message.
    #[error("Publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },

    #[cfg(feature = "kafka")]
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

/// Result type for messaging operations.
pub type Result<T> = std::result::Result<T, MessagingError>;
