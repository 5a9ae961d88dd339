//! rdkafka-backed [`MessageBus`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::Message as _;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Header, Headers, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;

use crate::{Message, MessageBus, MessageStream, MessagingError, Result};

/// Kafka producer plus a factory for per-subscription consumers.
///
/// Consumers run with `enable.auto.commit=false`; offsets are committed once
/// a record has been detached and handed to the stream.
#[derive(Clone)]
pub struct KafkaMessageBus {
    producer: FutureProducer,
    brokers: String,
    send_timeout: Duration,
}

impl KafkaMessageBus {
    /// Connects a producer to `brokers` (comma-separated list).
    pub fn new(brokers: &str) -> Result<Self> {
        tracing::info!(brokers, "initializing Kafka producer");

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("acks", "all")
            .set("enable.idempotence", "true")
            .set("message.timeout.ms", "30000")
            .create()?;

        Ok(Self {
            producer,
            brokers: brokers.to_string(),
            send_timeout: Duration::from_secs(5),
        })
    }

    fn consumer(&self, group_id: &str) -> Result<StreamConsumer> {
        let consumer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "3000")
            .create()?;
        Ok(consumer)
    }
}

fn detach(record: &BorrowedMessage<'_>) -> Message {
    let mut headers = BTreeMap::new();
    if let Some(record_headers) = record.headers() {
        for header in record_headers.iter() {
            if let Some(value) = header.value {
                headers.insert(
                    header.key.to_string(),
                    String::from_utf8_lossy(value).into_owned(),
                );
            }
        }
    }

    Message {
        topic: record.topic().to_string(),
        key: record
            .key()
            .map(|key| String::from_utf8_lossy(key).into_owned()),
        payload: record.payload().map(<[u8]>::to_vec).unwrap_or_default(),
        headers,
    }
}

#[async_trait]
impl MessageBus for KafkaMessageBus {
    async fn publish(&self, message: Message) -> Result<()> {
        let mut headers = OwnedHeaders::new();
        for (name, value) in &message.headers {
            headers = headers.insert(Header {
                key: name.as_str(),
                value: Some(value.as_bytes()),
            });
        }

        let mut record = FutureRecord::<str, [u8]>::to(&message.topic)
            .payload(message.payload.as_slice())
            .headers(headers);
        if let Some(key) = &message.key {
            record = record.key(key.as_str());
        }

        let started = std::time::Instant::now();
        self.producer
            .send(record, Timeout::After(self.send_timeout))
            .await
            .map_err(|(err, _)| MessagingError::Kafka(err))?;

        metrics::counter!("messages_published_total", "topic" => message.topic.clone())
            .increment(1);
        tracing::debug!(
            topic = %message.topic,
            latency_ms = started.elapsed().as_millis() as u64,
            "message persisted to Kafka"
        );
        Ok(())
    }

    async fn subscribe(&self, topics: &[String], group_id: &str) -> Result<MessageStream> {
        let consumer = self.consumer(group_id)?;
        let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        consumer.subscribe(&topic_refs)?;
        tracing::info!(?topics, group_id, "Kafka consumer subscribed");

        let stream = futures_util::stream::unfold(Arc::new(consumer), |consumer| async move {
            let item = match consumer.recv().await {
                Ok(record) => {
                    let message = detach(&record);
                    if let Err(err) = consumer.commit_message(&record, CommitMode::Async) {
                        tracing::warn!(error = %err, topic = %message.topic, "offset commit failed");
                    }
                    Ok(message)
                }
                Err(err) => Err(MessagingError::Kafka(err)),
            };
            Some((item, consumer))
        });
        Ok(Box::pin(stream))
    }
}
