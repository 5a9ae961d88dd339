//! Seller registration against a running marketplace mock.

use std::time::Duration;

use marketplace_mock::platform::Platform;
use store::domain::{IntegrationPlatform, StoreRegistrationRequestInfo};
use store::error::StoreError;
use store::integration::{KakaoAdaptor, MarketplaceClient, NaverAdaptor, RegisterStore};

/// Serves a fresh mock for `platform` on an ephemeral port and returns its base URL.
async fn spawn_marketplace(platform: Platform) -> String {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    let app = marketplace_mock::create_app(marketplace_mock::create_state(platform), handle);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}{}", platform.context_path())
}

fn client(platform: IntegrationPlatform, base_url: &str) -> MarketplaceClient {
    MarketplaceClient::new(platform, base_url, Duration::from_secs(5)).unwrap()
}

fn request(business_number: &str) -> StoreRegistrationRequestInfo {
    StoreRegistrationRequestInfo {
        business_name: "Kim's Fruit".to_string(),
        business_number: business_number.to_string(),
        representative_name: "Kim".to_string(),
        email: "kim@fruit.com".to_string(),
        phone: "010-1234-5678".to_string(),
    }
}

#[tokio::test]
async fn naver_registration_returns_pending_seller() {
    let base_url = spawn_marketplace(Platform::Naver).await;
    let adaptor = NaverAdaptor::new(client(IntegrationPlatform::Naver, &base_url));

    let info = adaptor.register(&request("123-45-67890")).await.unwrap();

    assert_eq!(info.platform, IntegrationPlatform::Naver);
    assert_eq!(info.status, "PENDING");
    assert!(info.platform_id.starts_with("SELLER_"));
}

#[tokio::test]
async fn kakao_registration_uses_kakao_ids() {
    let base_url = spawn_marketplace(Platform::Kakao).await;
    let adaptor = KakaoAdaptor::new(client(IntegrationPlatform::Kakao, &base_url));

    let info = adaptor.register(&request("123-45-67890")).await.unwrap();

    assert_eq!(info.platform, IntegrationPlatform::Kakao);
    assert!(info.platform_id.starts_with("KK_SEL_"));
}

#[tokio::test]
async fn duplicate_business_number_is_rejected() {
    let base_url = spawn_marketplace(Platform::Naver).await;
    let adaptor = NaverAdaptor::new(client(IntegrationPlatform::Naver, &base_url));
    adaptor.register(&request("123-45-67890")).await.unwrap();

    let err = adaptor.register(&request("123-45-67890")).await.unwrap_err();

    match err {
        StoreError::PlatformRejected { platform, message } => {
            assert_eq!(platform, IntegrationPlatform::Naver);
            assert_eq!(message, "Business number already registered");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_business_number_is_rejected_with_validation_message() {
    let base_url = spawn_marketplace(Platform::Naver).await;
    let adaptor = NaverAdaptor::new(client(IntegrationPlatform::Naver, &base_url));

    let err = adaptor.register(&request("1234567890")).await.unwrap_err();

    assert!(matches!(
        err,
        StoreError::PlatformRejected { ref message, .. } if message == "Request validation failed"
    ));
}

#[tokio::test]
async fn unreachable_marketplace_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let adaptor = NaverAdaptor::new(client(
        IntegrationPlatform::Naver,
        &format!("http://{addr}/naver-api"),
    ));

    let err = adaptor.register(&request("123-45-67890")).await.unwrap_err();

    assert!(matches!(err, StoreError::PlatformUnavailable { .. }));
}
