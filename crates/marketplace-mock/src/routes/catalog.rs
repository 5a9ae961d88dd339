//! Categories and notifications.

use axum::extract::State;

use super::{SharedState, Valid};
use crate::envelope::Envelope;
use crate::market::categories::CategoryView;
use crate::market::notifications::{NotificationRequest, NotificationView};

/// GET /v1/categories
pub async fn category_tree(State(state): State<SharedState>) -> Envelope<Vec<CategoryView>> {
    Envelope::success(state.marketplace.category_tree().await)
}

/// GET /v1/categories/active
pub async fn active_categories(State(state): State<SharedState>) -> Envelope<Vec<CategoryView>> {
    Envelope::success(state.marketplace.active_categories().await)
}

/// POST /v1/notifications/send
pub async fn send_notification(
    State(state): State<SharedState>,
    Valid(req): Valid<NotificationRequest>,
) -> Envelope<NotificationView> {
    Envelope::success(state.marketplace.send_notification(req).await)
}
