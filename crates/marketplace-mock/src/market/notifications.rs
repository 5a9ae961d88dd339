use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::orders::Order;
use super::{MarketData, Marketplace, unique_id};
use crate::error::Result;
use crate::validation::{Validate, Violations};

pub const ORDER_COMPLETE: &str = "ORDER_COMPLETE";
pub const DELIVERY_START: &str = "DELIVERY_START";
pub const DELIVERY_COMPLETE: &str = "DELIVERY_COMPLETE";
pub const ORDER_CANCEL: &str = "ORDER_CANCEL";

wire_enum!(NotificationStatus, "notification status" {
    Pending => "PENDING",
    Success => "SUCCESS",
    Failed => "FAILED",
});

/// A buyer notification. Delivery is simulated and always succeeds.
#[derive(Debug, Clone)]
pub struct Notification {
    pub notification_id: String,
    pub order_id: Option<String>,
    pub receiver_phone: String,
    pub template_code: String,
    pub message_content: String,
    pub send_status: NotificationStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /v1/notifications/send`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationRequest {
    pub receiver_phone: String,
    pub template_code: String,
    pub order_id: Option<String>,
    pub template_params: HashMap<String, String>,
}

impl Validate for NotificationRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required(&self.receiver_phone, "receiverPhone")
            .required(&self.template_code, "templateCode");
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub notification_id: String,
    pub order_id: Option<String>,
    pub receiver_phone: String,
    pub template_code: String,
    pub message_content: String,
    pub send_status: NotificationStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationView {
    fn from(n: &Notification) -> Self {
        Self {
            notification_id: n.notification_id.clone(),
            order_id: n.order_id.clone(),
            receiver_phone: n.receiver_phone.clone(),
            template_code: n.template_code.clone(),
            message_content: n.message_content.clone(),
            send_status: n.send_status,
            sent_at: n.sent_at,
            created_at: n.created_at,
        }
    }
}

/// Renders the message for a template code.
pub fn render_message(template_code: &str, params: &HashMap<String, String>) -> String {
    let order_id = params.get("orderId").map(String::as_str).unwrap_or_default();
    match template_code {
        ORDER_COMPLETE => format!("Your order has been placed. Order number: {order_id}"),
        DELIVERY_START => format!("Your order is on its way. Order number: {order_id}"),
        DELIVERY_COMPLETE => format!("Your order has been delivered. Order number: {order_id}"),
        ORDER_CANCEL => format!("Your order has been cancelled. Order number: {order_id}"),
        _ => "Marketplace notification".to_string(),
    }
}

impl MarketData {
    /// Records a sent notification and returns its index.
    pub(crate) fn notify(
        &mut self,
        prefix: &str,
        receiver_phone: &str,
        template_code: &str,
        order_id: Option<&str>,
        message_content: String,
    ) -> usize {
        let notification_id = unique_id(prefix, |id| {
            self.notifications.iter().any(|n| n.notification_id == id)
        });
        let now = Utc::now();
        self.notifications.push(Notification {
            notification_id,
            order_id: order_id.map(str::to_string),
            receiver_phone: receiver_phone.to_string(),
            template_code: template_code.to_string(),
            message_content,
            send_status: NotificationStatus::Success,
            sent_at: Some(now),
            created_at: now,
        });
        metrics::counter!("marketplace_notifications_total", "template" => template_code.to_string())
            .increment(1);
        self.notifications.len() - 1
    }

    /// Sends one of the order lifecycle templates for `order`.
    pub(crate) fn notify_order(&mut self, prefix: &str, order: &Order, template_code: &str) {
        let receiver = match template_code {
            DELIVERY_START | DELIVERY_COMPLETE => &order.receiver_phone,
            _ => &order.buyer_phone,
        };
        let params = HashMap::from([("orderId".to_string(), order.order_id.clone())]);
        let message = render_message(template_code, &params);
        self.notify(prefix, receiver, template_code, Some(&order.order_id), message);
    }
}

impl Marketplace {
    #[tracing::instrument(skip(self, request), fields(template = %request.template_code))]
    pub async fn send_notification(&self, request: NotificationRequest) -> NotificationView {
        let mut data = self.data.write().await;
        let order_id = request
            .order_id
            .as_deref()
            .filter(|id| data.order(id).is_ok())
            .map(str::to_string);
        let message = render_message(&request.template_code, &request.template_params);
        let index = data.notify(
            self.prefixes().notification,
            &request.receiver_phone,
            &request.template_code,
            order_id.as_deref(),
            message,
        );
        NotificationView::from(&data.notifications[index])
    }

    /// Notifications recorded for an order, oldest first.
    pub async fn order_notifications(&self, order_id: &str) -> Vec<NotificationView> {
        let data = self.data.read().await;
        data.notifications
            .iter()
            .filter(|n| n.order_id.as_deref() == Some(order_id))
            .map(NotificationView::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    #[test]
    fn known_templates_include_order_id() {
        let params = HashMap::from([("orderId".to_string(), "ORDER_1".to_string())]);
        assert_eq!(
            render_message(ORDER_COMPLETE, &params),
            "Your order has been placed. Order number: ORDER_1"
        );
        assert!(render_message(DELIVERY_START, &params).ends_with("ORDER_1"));
        assert_eq!(
            render_message("PROMOTION", &params),
            "Marketplace notification"
        );
    }

    #[tokio::test]
    async fn send_succeeds_and_drops_unknown_order() {
        let market = Marketplace::new(Platform::Kakao);
        let request = NotificationRequest {
            receiver_phone: "010-1111-2222".to_string(),
            template_code: ORDER_COMPLETE.to_string(),
            order_id: Some("KK_ORD_missing".to_string()),
            template_params: HashMap::from([("orderId".to_string(), "KK_ORD_1".to_string())]),
        };

        let sent = market.send_notification(request).await;

        assert!(sent.notification_id.starts_with("KK_NOTIF_"));
        assert_eq!(sent.send_status, NotificationStatus::Success);
        assert!(sent.sent_at.is_some());
        assert_eq!(sent.order_id, None);
        assert_eq!(
            sent.message_content,
            "Your order has been placed. Order number: KK_ORD_1"
        );
    }
}
