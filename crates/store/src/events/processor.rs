//! Bounded queue of store events drained by a small worker pool.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use super::{NotificationSender, ProductService, StoreEvent};

/// Sizing of the event worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventProcessorConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for EventProcessorConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 500,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventPublishError {
    #[error("store event queue is full")]
    QueueFull,
    #[error("store event queue is closed")]
    Closed,
}

/// Enqueues store events without waiting for them to be handled.
#[derive(Debug, Clone)]
pub struct StoreEventPublisher {
    tx: mpsc::Sender<StoreEvent>,
}

impl StoreEventPublisher {
    pub fn publish(&self, event: StoreEvent) -> Result<(), EventPublishError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EventPublishError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => EventPublishError::Closed,
        })?;
        metrics::counter!("store_events_published_total").increment(1);
        Ok(())
    }

    /// A publisher whose queue has no consumer left.
    #[cfg(test)]
    pub(crate) fn closed() -> Self {
        let (tx, _) = mpsc::channel(1);
        Self { tx }
    }
}

struct EventHandlers {
    senders: Vec<Arc<dyn NotificationSender>>,
    product_service: Arc<dyn ProductService>,
}

impl EventHandlers {
    #[tracing::instrument(skip(self, event), fields(event = event.name(), store_id = event.store().id))]
    async fn handle(&self, event: &StoreEvent) {
        self.notify(event).await;

        if let StoreEvent::Cancelled(store) = event {
            if let Err(e) = self.product_service.clear_products(store.id).await {
                tracing::error!(error = %e, "failed to clear products of cancelled store");
            }
        }
    }

    /// Runs every sender; a failing one does not stop the others.
    async fn notify(&self, event: &StoreEvent) {
        for sender in &self.senders {
            let channel = sender.channel();
            let outcome = match sender.send(event).await {
                Ok(()) => "sent",
                Err(e) => {
                    tracing::warn!(%channel, error = %e, "notification failed");
                    "failed"
                }
            };
            metrics::counter!(
                "store_notifications_total",
                "channel" => channel.as_str(),
                "outcome" => outcome
            )
            .increment(1);
        }
    }
}

/// Handles store events in the background.
///
/// Workers stop once every [`StoreEventPublisher`] is dropped and the queue
/// is drained.
pub struct StoreEventProcessor {
    workers: Vec<JoinHandle<()>>,
}

impl StoreEventProcessor {
    pub fn start(
        senders: Vec<Arc<dyn NotificationSender>>,
        product_service: Arc<dyn ProductService>,
        config: EventProcessorConfig,
    ) -> (StoreEventPublisher, Self) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let handlers = Arc::new(EventHandlers {
            senders,
            product_service,
        });

        let workers = (0..config.workers.max(1))
            .map(|worker| {
                let rx = Arc::clone(&rx);
                let handlers = Arc::clone(&handlers);
                tokio::spawn(async move {
                    loop {
                        let event = rx.lock().await.recv().await;
                        let Some(event) = event else {
                            break;
                        };
                        handlers.handle(&event).await;
                    }
                    tracing::debug!(worker, "store event worker stopped");
                })
            })
            .collect();

        tracing::info!(
            workers = config.workers.max(1),
            queue_capacity = config.queue_capacity.max(1),
            "store event processor started"
        );

        (StoreEventPublisher { tx }, Self { workers })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Waits for the workers to drain the queue and stop.
    pub async fn join(self) {
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "store event worker panicked");
            }
        }
    }
}
