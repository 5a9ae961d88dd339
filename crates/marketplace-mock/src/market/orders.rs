use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use common::{PageRequest, PageResponse};
use serde::{Deserialize, Serialize};

use super::notifications::{DELIVERY_COMPLETE, DELIVERY_START, ORDER_CANCEL, ORDER_COMPLETE};
use super::products::{MAX_QUANTITY, add_amounts, line_total};
use super::{Marketplace, unique_id};
use crate::error::{MarketError, Result};
use crate::validation::{Validate, Violations};

wire_enum!(PaymentMethod, "payment method" {
    KakaoPay => "KAKAO_PAY",
    Card => "CARD",
    BankTransfer => "BANK_TRANSFER",
    Phone => "PHONE",
});

wire_enum!(OrderStatus, "order status" {
    PaymentWaiting => "PAYMENT_WAITING",
    Payed => "PAYED",
    Delivering => "DELIVERING",
    Delivered => "DELIVERED",
    PurchaseDecided => "PURCHASE_DECIDED",
    Exchanged => "EXCHANGED",
    Canceled => "CANCELED",
    Returned => "RETURNED",
});

impl OrderStatus {
    /// Template sent to the buyer when an order moves into this status.
    pub fn notification_template(&self) -> Option<&'static str> {
        match self {
            OrderStatus::Delivering => Some(DELIVERY_START),
            OrderStatus::Delivered => Some(DELIVERY_COMPLETE),
            OrderStatus::Canceled => Some(ORDER_CANCEL),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub option_id: Option<String>,
    /// `"{option name}: {option value}"`
    pub option_value: Option<String>,
    pub quantity: i32,
    /// Unit price including the option surcharge.
    pub price: i64,
    pub status: OrderStatus,
}

/// An order placed with a single seller.
#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: String,
    pub seller_id: String,
    pub kakao_order_id: Option<String>,
    pub order_date: DateTime<Utc>,
    pub buyer_name: String,
    pub buyer_email: Option<String>,
    pub buyer_phone: String,
    pub buyer_kakao_id: Option<String>,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_zipcode: String,
    pub receiver_address: String,
    pub receiver_address_detail: Option<String>,
    pub payment_method: PaymentMethod,
    pub total_amount: i64,
    pub delivery_message: Option<String>,
    pub order_status: OrderStatus,
    pub items: Vec<OrderItem>,
}

// -- Requests --

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: String,
    pub option_id: Option<String>,
    pub quantity: i32,
}

/// Body of `POST /v1/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderCreateRequest {
    pub items: Vec<OrderItemRequest>,
    pub buyer_name: String,
    pub buyer_email: Option<String>,
    pub buyer_phone: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_zipcode: String,
    pub receiver_address: String,
    pub receiver_address_detail: Option<String>,
    pub payment_method: String,
    pub delivery_message: Option<String>,
    pub kakao_order_id: Option<String>,
}

impl Default for OrderCreateRequest {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            buyer_name: String::new(),
            buyer_email: None,
            buyer_phone: String::new(),
            receiver_name: String::new(),
            receiver_phone: String::new(),
            receiver_zipcode: String::new(),
            receiver_address: String::new(),
            receiver_address_detail: None,
            payment_method: PaymentMethod::KakaoPay.as_str().to_string(),
            delivery_message: None,
            kakao_order_id: None,
        }
    }
}

impl Validate for OrderCreateRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.check(!self.items.is_empty(), "items", "must not be empty")
            .required(&self.buyer_name, "buyerName")
            .required(&self.buyer_phone, "buyerPhone")
            .required(&self.receiver_name, "receiverName")
            .required(&self.receiver_phone, "receiverPhone")
            .required(&self.receiver_zipcode, "receiverZipcode")
            .required(&self.receiver_address, "receiverAddress")
            .required(&self.payment_method, "paymentMethod");
        for (i, item) in self.items.iter().enumerate() {
            v.required(&item.product_id, &format!("items[{i}].productId"))
                .check(
                    item.quantity >= 1,
                    &format!("items[{i}].quantity"),
                    "must be greater than 0",
                )
                .check(
                    item.quantity <= MAX_QUANTITY,
                    &format!("items[{i}].quantity"),
                    &format!("must be at most {MAX_QUANTITY}"),
                );
        }
        v.finish()
    }
}

/// Query of the seller order listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderSearchQuery {
    pub order_status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub payment_method: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl Default for OrderSearchQuery {
    fn default() -> Self {
        let paging = PageRequest::default();
        Self {
            order_status: None,
            start_date: None,
            end_date: None,
            payment_method: None,
            page: paging.page,
            size: paging.size,
        }
    }
}

impl OrderSearchQuery {
    pub fn paging(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderStatusUpdateRequest {
    pub status: String,
    pub reason: Option<String>,
}

impl Validate for OrderStatusUpdateRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required(&self.status, "status");
        v.finish()
    }
}

// -- Views --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerInfo {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub kakao_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverInfo {
    pub name: String,
    pub phone: String,
    pub zipcode: String,
    pub address: String,
    pub address_detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order_id: String,
    pub seller_id: String,
    pub kakao_order_id: Option<String>,
    pub order_date: DateTime<Utc>,
    pub buyer: BuyerInfo,
    pub receiver: ReceiverInfo,
    pub payment_method: PaymentMethod,
    pub total_amount: i64,
    pub delivery_message: Option<String>,
    pub order_status: OrderStatus,
    pub order_items: Vec<OrderItem>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.clone(),
            seller_id: order.seller_id.clone(),
            kakao_order_id: order.kakao_order_id.clone(),
            order_date: order.order_date,
            buyer: BuyerInfo {
                name: order.buyer_name.clone(),
                email: order.buyer_email.clone(),
                phone: order.buyer_phone.clone(),
                kakao_id: order.buyer_kakao_id.clone(),
            },
            receiver: ReceiverInfo {
                name: order.receiver_name.clone(),
                phone: order.receiver_phone.clone(),
                zipcode: order.receiver_zipcode.clone(),
                address: order.receiver_address.clone(),
                address_detail: order.receiver_address_detail.clone(),
            },
            payment_method: order.payment_method,
            total_amount: order.total_amount,
            delivery_message: order.delivery_message.clone(),
            order_status: order.order_status,
            order_items: order.items.clone(),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| MarketError::business(format!("Invalid date: {value}")))
}

/// Newest first.
fn page_of<'a>(
    orders: impl DoubleEndedIterator<Item = &'a Order>,
    paging: &PageRequest,
) -> PageResponse<OrderView> {
    let newest_first: Vec<&Order> = orders.rev().collect();
    PageResponse::paginate(newest_first, paging).map(OrderView::from)
}

impl Marketplace {
    /// Places an order.
    ///
    /// All items must come from one seller and be in stock; option stock is
    /// checked when an option is chosen. On success the stock is taken, the
    /// ordered products leave the buyer's cart and the buyer is notified.
    #[tracing::instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn create_order(
        &self,
        buyer_kakao_id: Option<&str>,
        request: OrderCreateRequest,
    ) -> Result<OrderView> {
        let payment_method: PaymentMethod = request.payment_method.parse()?;
        let mut data = self.data.write().await;

        let mut seller_id: Option<String> = None;
        let mut reserved: HashMap<(String, Option<String>), i32> = HashMap::new();
        let mut items = Vec::with_capacity(request.items.len());
        let mut total_amount = 0i64;

        for line in &request.items {
            let product = data
                .product(&line.product_id)
                .map_err(|_| MarketError::business(format!("Product not found: {}", line.product_id)))?;

            let owner = seller_id.get_or_insert_with(|| product.seller_id.clone());
            if *owner != product.seller_id {
                return Err(MarketError::business(
                    "Products from different sellers cannot be ordered together",
                ));
            }

            let option = line
                .option_id
                .as_deref()
                .map(|id| product.option(id))
                .transpose()?;
            let available = option.map_or(product.stock_quantity, |o| o.stock_quantity);
            let key = (line.product_id.clone(), line.option_id.clone());
            let already = reserved.get(&key).copied().unwrap_or(0);
            if available - already < line.quantity {
                return Err(MarketError::business(format!(
                    "Insufficient stock: {}",
                    product.name
                )));
            }
            reserved.insert(key, already + line.quantity);

            let price = product.unit_price(option)?;
            total_amount = add_amounts(total_amount, line_total(price, line.quantity)?)?;
            items.push(OrderItem {
                product_id: product.product_id.clone(),
                product_name: product.name.clone(),
                option_id: option.map(|o| o.option_id.clone()),
                option_value: option.map(|o| format!("{}: {}", o.option_name, o.option_value)),
                quantity: line.quantity,
                price,
                status: OrderStatus::PaymentWaiting,
            });
        }
        let seller_id = seller_id.ok_or_else(|| MarketError::field("items", "must not be empty"))?;

        for ((product_id, option_id), quantity) in &reserved {
            let product = data.product_mut(product_id)?;
            match option_id {
                Some(option_id) => {
                    if let Some(option) = product
                        .options
                        .iter_mut()
                        .find(|o| &o.option_id == option_id)
                    {
                        option.stock_quantity -= quantity;
                    }
                }
                None => product.stock_quantity -= quantity,
            }
        }

        if let Some(buyer) = buyer_kakao_id {
            data.carts.retain(|c| {
                !(c.buyer_kakao_id == buyer
                    && request.items.iter().any(|i| i.product_id == c.product_id))
            });
        }

        let prefixes = self.prefixes();
        let order_id = unique_id(prefixes.order, |id| {
            data.orders.iter().any(|o| o.order_id == id)
        });
        let order = Order {
            order_id,
            seller_id,
            kakao_order_id: request.kakao_order_id,
            order_date: Utc::now(),
            buyer_name: request.buyer_name,
            buyer_email: request.buyer_email,
            buyer_phone: request.buyer_phone,
            buyer_kakao_id: buyer_kakao_id.map(str::to_string),
            receiver_name: request.receiver_name,
            receiver_phone: request.receiver_phone,
            receiver_zipcode: request.receiver_zipcode,
            receiver_address: request.receiver_address,
            receiver_address_detail: request.receiver_address_detail,
            payment_method,
            total_amount,
            delivery_message: request.delivery_message,
            order_status: OrderStatus::PaymentWaiting,
            items,
        };
        data.notify_order(prefixes.notification, &order, ORDER_COMPLETE);
        let view = OrderView::from(&order);
        data.orders.push(order);

        metrics::counter!("marketplace_orders_created_total", "platform" => self.platform.as_str())
            .increment(1);
        tracing::info!(order_id = %view.order_id, total_amount, "order created");
        Ok(view)
    }

    /// The seller's orders filtered by the first present criterion in order
    /// date range, status, payment method.
    pub async fn seller_orders(
        &self,
        seller_id: &str,
        query: &OrderSearchQuery,
    ) -> Result<PageResponse<OrderView>> {
        let data = self.data.read().await;
        let own = data.orders.iter().filter(|o| o.seller_id == seller_id);
        let paging = query.paging();

        let page = if let (Some(start), Some(end)) = (&query.start_date, &query.end_date) {
            let (start, end) = (parse_date(start)?, parse_date(end)?);
            page_of(
                own.filter(|o| {
                    let day = o.order_date.date_naive();
                    start <= day && day <= end
                }),
                &paging,
            )
        } else if let Some(status) = &query.order_status {
            let status: OrderStatus = status.parse()?;
            page_of(own.filter(|o| o.order_status == status), &paging)
        } else if let Some(method) = &query.payment_method {
            let method: PaymentMethod = method.parse()?;
            page_of(own.filter(|o| o.payment_method == method), &paging)
        } else {
            page_of(own, &paging)
        };
        Ok(page)
    }

    pub async fn buyer_orders(&self, kakao_id: &str, paging: &PageRequest) -> PageResponse<OrderView> {
        let data = self.data.read().await;
        page_of(
            data.orders
                .iter()
                .filter(|o| o.buyer_kakao_id.as_deref() == Some(kakao_id)),
            paging,
        )
    }

    pub async fn get_order(&self, seller_id: &str, order_id: &str) -> Result<OrderView> {
        let data = self.data.read().await;
        let order = data.order(order_id)?;
        if order.seller_id != seller_id {
            return Err(MarketError::business("Not allowed to view this order"));
        }
        Ok(OrderView::from(order))
    }

    /// Moves an order and all its items to a new status, notifying the
    /// buyer on delivery start, delivery and cancellation.
    #[tracing::instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_order_status(
        &self,
        seller_id: &str,
        order_id: &str,
        request: OrderStatusUpdateRequest,
    ) -> Result<OrderView> {
        let mut data = self.data.write().await;
        let order = data
            .orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| MarketError::business("Order not found"))?;
        if order.seller_id != seller_id {
            return Err(MarketError::business("Not allowed to modify this order"));
        }
        let status: OrderStatus = request.status.parse()?;

        order.order_status = status;
        for item in &mut order.items {
            item.status = status;
        }
        let order = order.clone();

        if let Some(template) = status.notification_template() {
            data.notify_order(self.prefixes().notification, &order, template);
        }
        tracing::info!(reason = request.reason.as_deref().unwrap_or(""), "order status changed");
        Ok(OrderView::from(&order))
    }
}
