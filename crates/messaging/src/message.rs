use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Header carrying the 1-based delivery attempt of a retried message.
pub const RETRY_ATTEMPT_HEADER: &str = "retry-attempt";
/// Header naming the topic a dead-lettered message was first published to.
pub const DLT_ORIGINAL_TOPIC_HEADER: &str = "dlt-original-topic";
/// Header carrying the last handler error of a dead-lettered message.
pub const DLT_EXCEPTION_MESSAGE_HEADER: &str = "dlt-exception-message";

/// A single record on a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub headers: BTreeMap<String, String>,
}

impl Message {
    pub fn new(topic: impl Into<String>, key: Option<String>, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            key,
            payload,
            headers: BTreeMap::new(),
        }
    }

    /// Builds a message whose payload is `value` encoded as JSON.
    pub fn json<T: Serialize>(
        topic: impl Into<String>,
        key: Option<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(topic, key, serde_json::to_vec(value)?))
    }

    /// Decodes the JSON payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Delivery attempt of this message; first deliveries carry no header.
    pub fn attempt(&self) -> u32 {
        self.header(RETRY_ATTEMPT_HEADER)
            .and_then(|value| value.parse().ok())
            .unwrap_or(1)
    }

    /// Copy of this message addressed to another topic.
    pub fn redirect(&self, topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..self.clone()
        }
    }
}
