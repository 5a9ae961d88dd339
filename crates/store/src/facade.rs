//! Store registration workflow spanning marketplaces, storage and events.

use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;

use crate::domain::{IntegrationPlatform, Store, StoreRegistrationRequestInfo};
use crate::error::{Result, StoreError};
use crate::events::{StoreEvent, StoreEventPublisher};
use crate::integration::StoreIntegrationFactory;
use crate::repository::StoreRepository;
use crate::service::{StoreDetails, StoreService};

pub const MAX_BUSINESS_NAME_LENGTH: usize = 200;
pub const MAX_REPRESENTATIVE_NAME_LENGTH: usize = 100;

static BUSINESS_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{2}-\d{5}$").expect("valid business number pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,3}-\d{3,4}-\d{4}$").expect("valid phone pattern"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// A request to open a store on a marketplace.
#[derive(Debug, Clone)]
pub struct RegisterStoreCommand {
    pub business_name: String,
    pub business_number: String,
    pub representative_name: String,
    pub email: String,
    pub phone: String,
    pub user_id: i64,
    pub description: Option<String>,
    pub platform: IntegrationPlatform,
}

impl RegisterStoreCommand {
    /// Checks the business details before anything is sent out.
    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();

        if self.business_name.trim().is_empty() {
            violations.push("businessName is required".to_string());
        } else if self.business_name.chars().count() > MAX_BUSINESS_NAME_LENGTH {
            violations.push(format!(
                "businessName must be at most {MAX_BUSINESS_NAME_LENGTH} characters"
            ));
        }

        if self.business_number.trim().is_empty() {
            violations.push("businessNumber is required".to_string());
        } else if !BUSINESS_NUMBER.is_match(&self.business_number) {
            violations.push("businessNumber must look like 123-45-67890".to_string());
        }

        if self.representative_name.trim().is_empty() {
            violations.push("representativeName is required".to_string());
        } else if self.representative_name.chars().count() > MAX_REPRESENTATIVE_NAME_LENGTH {
            violations.push(format!(
                "representativeName must be at most {MAX_REPRESENTATIVE_NAME_LENGTH} characters"
            ));
        }

        if self.email.trim().is_empty() {
            violations.push("email is required".to_string());
        } else if !EMAIL.is_match(&self.email) {
            violations.push("email is malformed".to_string());
        }

        if self.phone.trim().is_empty() {
            violations.push("phone is required".to_string());
        } else if !PHONE.is_match(&self.phone) {
            violations.push("phone must look like 010-1234-5678".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(violations.join("; ")))
        }
    }

    fn request_info(&self) -> StoreRegistrationRequestInfo {
        StoreRegistrationRequestInfo {
            business_name: self.business_name.clone(),
            business_number: self.business_number.clone(),
            representative_name: self.representative_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    fn details(&self) -> StoreDetails {
        StoreDetails {
            name: self.business_name.clone(),
            description: self.description.clone(),
            user_id: self.user_id,
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Coordinates a store registration.
///
/// The workflow runs in order: validate, register on the marketplace,
/// persist locally, then enqueue a [`StoreEvent`]. Once the store is
/// persisted the request succeeds even if the event cannot be enqueued.
pub struct StoreFacade<R: StoreRepository> {
    factory: StoreIntegrationFactory,
    service: StoreService<R>,
    events: StoreEventPublisher,
}

impl<R: StoreRepository> StoreFacade<R> {
    pub fn new(
        factory: StoreIntegrationFactory,
        service: StoreService<R>,
        events: StoreEventPublisher,
    ) -> Self {
        Self {
            factory,
            service,
            events,
        }
    }

    pub fn service(&self) -> &StoreService<R> {
        &self.service
    }

    #[tracing::instrument(
        skip(self, command),
        fields(platform = %command.platform, user_id = command.user_id)
    )]
    pub async fn register_store(&self, command: RegisterStoreCommand) -> Result<Store> {
        let started = Instant::now();
        let result = self.run_registration(&command).await;

        let outcome = match &result {
            Ok(_) => "registered",
            Err(StoreError::Validation(_)) => "invalid",
            Err(StoreError::PlatformRejected { .. }) => "rejected",
            Err(_) => "failed",
        };
        metrics::counter!(
            "store_registrations_total",
            "platform" => command.platform.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("store_registration_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        result
    }

    async fn run_registration(&self, command: &RegisterStoreCommand) -> Result<Store> {
        command.validate()?;

        tracing::info!(step = "marketplace_registration", "store registration step started");
        let registration = self
            .factory
            .register_store(command.platform, &command.request_info())
            .await?;
        tracing::info!(
            platform_id = %registration.platform_id,
            seller_status = %registration.status,
            "seller registered on marketplace"
        );

        tracing::info!(step = "persist", "store registration step started");
        let store = self
            .service
            .register_store(command.details(), &registration)
            .await?;

        self.publish(StoreEvent::Registered(store.clone()));
        tracing::info!(store_id = store.id, status = %store.status, "store registered");
        Ok(store)
    }

    /// Cancels a store on behalf of its owner.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_store(&self, id: i64, user_id: i64) -> Result<Store> {
        let store = self.service.cancel_store(id, user_id).await?;
        self.publish(StoreEvent::Cancelled(store.clone()));
        tracing::info!(store_id = store.id, "store cancelled");
        Ok(store)
    }

    pub async fn get_store(&self, id: i64) -> Result<Store> {
        self.service.get_store(id).await
    }

    pub async fn get_user_stores(&self, user_id: i64) -> Result<Vec<Store>> {
        self.service.get_user_stores(user_id).await
    }

    fn publish(&self, event: StoreEvent) {
        let name = event.name();
        let store_id = event.store().id;
        if let Err(e) = self.events.publish(event) {
            tracing::error!(event = name, store_id, error = %e, "store event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{StoreRegistrationInfo, StoreStatus};
    use crate::events::{
        EventProcessorConfig, InMemoryNotificationSender, InMemoryProductService,
        NotificationChannel, StoreEventProcessor,
    };
    use crate::integration::RegisterStore;
    use crate::repository::InMemoryStoreRepository;

    struct StubAdaptor {
        status: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RegisterStore for StubAdaptor {
        fn platform(&self) -> IntegrationPlatform {
            IntegrationPlatform::Naver
        }

        async fn register(
            &self,
            _request: &StoreRegistrationRequestInfo,
        ) -> Result<StoreRegistrationInfo> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(StoreRegistrationInfo {
                platform_id: format!("SELLER_{n}"),
                status: self.status.to_string(),
                platform: IntegrationPlatform::Naver,
            })
        }
    }

    fn command() -> RegisterStoreCommand {
        RegisterStoreCommand {
            business_name: "Kim's Shop".to_string(),
            business_number: "123-45-67890".to_string(),
            representative_name: "Kim".to_string(),
            email: "kim@shop.com".to_string(),
            phone: "010-1234-5678".to_string(),
            user_id: 7,
            description: Some("fresh fruit".to_string()),
            platform: IntegrationPlatform::Naver,
        }
    }

    fn factory(status: &'static str, calls: &Arc<AtomicUsize>) -> StoreIntegrationFactory {
        StoreIntegrationFactory::new().with_adaptor(Box::new(StubAdaptor {
            status,
            calls: calls.clone(),
        }))
    }

    #[test]
    fn valid_command_passes_validation() {
        assert!(command().validate().is_ok());
    }

    #[test]
    fn validation_reports_every_violation() {
        let mut cmd = command();
        cmd.business_number = "1234567890".to_string();
        cmd.phone = "01012345678".to_string();
        cmd.email = "not-an-email".to_string();
        cmd.representative_name = "  ".to_string();
        cmd.business_name = "x".repeat(MAX_BUSINESS_NAME_LENGTH + 1);

        let Err(StoreError::Validation(message)) = cmd.validate() else {
            panic!("expected validation error");
        };
        assert!(message.contains("businessNumber"));
        assert!(message.contains("phone"));
        assert!(message.contains("email"));
        assert!(message.contains("representativeName"));
        assert!(message.contains("businessName"));
    }

    #[test]
    fn two_digit_area_code_phone_is_valid() {
        let mut cmd = command();
        cmd.phone = "02-123-4567".to_string();
        assert!(cmd.validate().is_ok());
    }

    #[tokio::test]
    async fn register_store_runs_every_step() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mail = InMemoryNotificationSender::new(NotificationChannel::Mail);
        let (publisher, processor) = StoreEventProcessor::start(
            vec![Arc::new(mail.clone())],
            Arc::new(InMemoryProductService::new()),
            EventProcessorConfig::default(),
        );
        let facade = StoreFacade::new(
            factory("PENDING", &calls),
            StoreService::new(InMemoryStoreRepository::new()),
            publisher,
        );

        let store = facade.register_store(command()).await.unwrap();

        assert_eq!(store.status, StoreStatus::Register);
        assert_eq!(store.integrations[0].platform_id, "SELLER_1");
        assert_eq!(store.description.as_deref(), Some("fresh fruit"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(facade);
        processor.join().await;
        let deliveries = mail.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].store_id, store.id);
    }

    #[tokio::test]
    async fn invalid_command_never_reaches_marketplace() {
        let calls = Arc::new(AtomicUsize::new(0));
        let repository = InMemoryStoreRepository::new();
        let facade = StoreFacade::new(
            factory("PENDING", &calls),
            StoreService::new(repository.clone()),
            StoreEventPublisher::closed(),
        );

        let mut cmd = command();
        cmd.email = "broken".to_string();

        assert!(matches!(
            facade.register_store(cmd).await,
            Err(StoreError::Validation(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(repository.store_count().await, 0);
    }

    #[tokio::test]
    async fn unsupported_platform_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let facade = StoreFacade::new(
            factory("PENDING", &calls),
            StoreService::new(InMemoryStoreRepository::new()),
            StoreEventPublisher::closed(),
        );

        let mut cmd = command();
        cmd.platform = IntegrationPlatform::Gmarket;

        assert!(matches!(
            facade.register_store(cmd).await,
            Err(StoreError::UnsupportedPlatform(IntegrationPlatform::Gmarket))
        ));
    }

    #[tokio::test]
    async fn unknown_marketplace_status_persists_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let repository = InMemoryStoreRepository::new();
        let facade = StoreFacade::new(
            factory("ON_HOLD", &calls),
            StoreService::new(repository.clone()),
            StoreEventPublisher::closed(),
        );

        assert!(matches!(
            facade.register_store(command()).await,
            Err(StoreError::UnknownPlatformStatus { .. })
        ));
        assert_eq!(repository.store_count().await, 0);
    }

    #[tokio::test]
    async fn event_failure_does_not_fail_registration() {
        let calls = Arc::new(AtomicUsize::new(0));
        let repository = InMemoryStoreRepository::new();
        let facade = StoreFacade::new(
            factory("APPROVED", &calls),
            StoreService::new(repository.clone()),
            StoreEventPublisher::closed(),
        );

        let store = facade.register_store(command()).await.unwrap();
        assert_eq!(store.status, StoreStatus::Confirm);
        assert_eq!(repository.store_count().await, 1);
    }

    #[tokio::test]
    async fn cancel_store_publishes_cancellation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sms = InMemoryNotificationSender::new(NotificationChannel::Sms);
        let products = InMemoryProductService::new();
        let (publisher, processor) = StoreEventProcessor::start(
            vec![Arc::new(sms.clone())],
            Arc::new(products.clone()),
            EventProcessorConfig::default(),
        );
        let facade = StoreFacade::new(
            factory("PENDING", &calls),
            StoreService::new(InMemoryStoreRepository::new()),
            publisher,
        );
        let store = facade.register_store(command()).await.unwrap();

        assert!(matches!(
            facade.cancel_store(store.id, 99).await,
            Err(StoreError::NotOwner { .. })
        ));
        let cancelled = facade.cancel_store(store.id, 7).await.unwrap();
        assert!(cancelled.is_deleted());

        drop(facade);
        processor.join().await;
        assert_eq!(sms.delivery_count().await, 2);
        assert_eq!(products.cleared_stores().await, vec![store.id]);
    }
}
