use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::StoreEvent;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationChannel {
    Mail,
    Sms,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Mail => "MAIL",
            NotificationChannel::Sms => "SMS",
        }
    }

    /// Where the store owner is reached on this channel.
    pub fn recipient<'a>(&self, event: &'a StoreEvent) -> &'a str {
        match self {
            NotificationChannel::Mail => &event.store().email,
            NotificationChannel::Sms => &event.store().phone,
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tells the store owner about a store event.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    fn channel(&self) -> NotificationChannel;

    async fn send(&self, event: &StoreEvent) -> Result<()>;
}

fn message(event: &StoreEvent) -> String {
    let store = event.store();
    match event {
        StoreEvent::Registered(_) => format!(
            "Store '{}' (#{}) was registered with status {}",
            store.name, store.id, store.status
        ),
        StoreEvent::Cancelled(_) => {
            format!("Store '{}' (#{}) was cancelled", store.name, store.id)
        }
    }
}

/// Mails the store owner.
#[derive(Debug, Clone, Default)]
pub struct MailSender;

#[async_trait]
impl NotificationSender for MailSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Mail
    }

    async fn send(&self, event: &StoreEvent) -> Result<()> {
        tracing::info!(
            to = %event.store().email,
            store_id = event.store().id,
            body = %message(event),
            "mail sent"
        );
        Ok(())
    }
}

/// Texts the store owner.
#[derive(Debug, Clone, Default)]
pub struct SmsSender;

#[async_trait]
impl NotificationSender for SmsSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Sms
    }

    async fn send(&self, event: &StoreEvent) -> Result<()> {
        tracing::info!(
            to = %event.store().phone,
            store_id = event.store().id,
            body = %message(event),
            "sms sent"
        );
        Ok(())
    }
}

/// A notification recorded by [`InMemoryNotificationSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: NotificationChannel,
    pub store_id: i64,
    pub event: &'static str,
    pub recipient: String,
}

#[derive(Debug, Default)]
struct InMemorySenderState {
    deliveries: Vec<Delivery>,
    fail_on_send: bool,
}

/// Records deliveries instead of sending them.
#[derive(Debug, Clone)]
pub struct InMemoryNotificationSender {
    channel: NotificationChannel,
    state: Arc<RwLock<InMemorySenderState>>,
}

impl InMemoryNotificationSender {
    pub fn new(channel: NotificationChannel) -> Self {
        Self {
            channel,
            state: Arc::default(),
        }
    }

    /// Configures the sender to fail on the next sends.
    pub async fn set_fail_on_send(&self, fail: bool) {
        self.state.write().await.fail_on_send = fail;
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.state.read().await.deliveries.clone()
    }

    pub async fn delivery_count(&self) -> usize {
        self.state.read().await.deliveries.len()
    }
}

#[async_trait]
impl NotificationSender for InMemoryNotificationSender {
    fn channel(&self) -> NotificationChannel {
        self.channel
    }

    async fn send(&self, event: &StoreEvent) -> Result<()> {
        let mut state = self.state.write().await;

        if state.fail_on_send {
            return Err(StoreError::Delivery {
                channel: self.channel.to_string(),
                reason: "sender unavailable".to_string(),
            });
        }

        state.deliveries.push(Delivery {
            channel: self.channel,
            store_id: event.store().id,
            event: event.name(),
            recipient: self.channel.recipient(event).to_string(),
        });
        Ok(())
    }
}
