//! Store lifecycle events and their asynchronous fan-out.

pub mod notification;
pub mod processor;
pub mod product;

pub use notification::{
    Delivery, InMemoryNotificationSender, MailSender, NotificationChannel, NotificationSender,
    SmsSender,
};
pub use processor::{EventProcessorConfig, EventPublishError, StoreEventProcessor, StoreEventPublisher};
pub use product::{InMemoryProductService, ProductService};

use crate::domain::Store;

/// Something that happened to a store after it was persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Registered(Store),
    Cancelled(Store),
}

impl StoreEvent {
    pub fn store(&self) -> &Store {
        match self {
            StoreEvent::Registered(store) | StoreEvent::Cancelled(store) => store,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::Registered(_) => "registered",
            StoreEvent::Cancelled(_) => "cancelled",
        }
    }
}
