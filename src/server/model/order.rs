//! Order domain models and parameters.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use std::str::FromStr;

use crate::{
    model::{
        delivery::DeliveryDto,
        order::{CreateOrderDto, OrderDiscountDto, OrderDto, OrderItemDto, ShopQuoteDto},
    },
    server::model::{
        delivery::{DeliveryMethod, DeliveryQuote, DeliveryStatus, DeliveryType, StatusLog},
        invalid_column,
    },
};

/// Order lifecycle.
///
/// `PENDING -> CONFIRMED -> DELIVERY -> COMPLETED`, with `CANCELLED` reachable
/// from `PENDING`/`CONFIRMED` and `RETURNED` from `DELIVERY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivery,
    Completed,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Delivery => "DELIVERY",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Returned => "RETURNED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "DELIVERY" => Ok(Self::Delivery),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            "RETURNED" => Ok(Self::Returned),
            other => Err(format!("Unknown order status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    /// Saved card, charged at checkout.
    Card,
    /// Hosted payment page.
    Gateway,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Card => "CARD",
            Self::Gateway => "GATEWAY",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(Self::Cod),
            "CARD" => Ok(Self::Card),
            "GATEWAY" => Ok(Self::Gateway),
            other => Err(format!("Unknown payment method '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: i32,
    pub product_name: String,
    pub price: i64,
    pub quantity: i32,
}

impl OrderItem {
    pub fn from_entity(entity: entity::order_item::Model) -> Self {
        Self {
            product_id: entity.product_id,
            product_name: entity.product_name,
            price: entity.price,
            quantity: entity.quantity,
        }
    }

    pub fn line_total(&self) -> i64 {
        self.price * self.quantity as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderDiscount {
    pub discount_id: i32,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i32,
    pub tracking_id: String,
    pub user_id: i32,
    pub shop_id: i32,
    pub address_id: i32,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub discounts: Vec<OrderDiscount>,
    pub subtotal: i64,
    pub discount_total: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub delivery_method: DeliveryMethod,
    pub delivery_type: DeliveryType,
    pub status_log: StatusLog,
    pub courier_delivery_id: Option<String>,
    pub courier_tracking_url: Option<String>,
    pub note: Option<String>,
    pub is_paid: bool,
    pub payment_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Converts the order row and its children at the repository boundary.
    ///
    /// # Returns
    /// - `Err(DbErr::Custom)` - A stored enum column or the status log is malformed
    pub fn from_entity(
        entity: entity::order::Model,
        items: Vec<entity::order_item::Model>,
        discounts: Vec<entity::order_discount::Model>,
    ) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            tracking_id: entity.tracking_id,
            user_id: entity.user_id,
            shop_id: entity.shop_id,
            address_id: entity.address_id,
            payment_method: entity
                .payment_method
                .parse()
                .map_err(|_| invalid_column("orders.payment_method", &entity.payment_method))?,
            status: entity
                .status
                .parse()
                .map_err(|_| invalid_column("orders.status", &entity.status))?,
            items: items.into_iter().map(OrderItem::from_entity).collect(),
            discounts: discounts
                .into_iter()
                .map(|d| OrderDiscount {
                    discount_id: d.discount_id,
                    amount: d.amount,
                })
                .collect(),
            subtotal: entity.subtotal,
            discount_total: entity.discount_total,
            delivery_fee: entity.delivery_fee,
            total: entity.total,
            delivery_method: entity
                .delivery_method
                .parse()
                .map_err(|_| invalid_column("orders.delivery_method", &entity.delivery_method))?,
            delivery_type: entity
                .delivery_type
                .parse()
                .map_err(|_| invalid_column("orders.delivery_type", &entity.delivery_type))?,
            status_log: StatusLog::from_json(&entity.delivery_status_log)?,
            courier_delivery_id: entity.courier_delivery_id,
            courier_tracking_url: entity.courier_tracking_url,
            note: entity.note,
            is_paid: entity.is_paid,
            payment_id: entity.payment_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }

    pub fn into_dto(self) -> OrderDto {
        OrderDto {
            id: self.id,
            tracking_id: self.tracking_id,
            user_id: self.user_id,
            shop_id: self.shop_id,
            address_id: self.address_id,
            payment_method: self.payment_method.as_str().to_string(),
            status: self.status.as_str().to_string(),
            items: self
                .items
                .into_iter()
                .map(|i| OrderItemDto {
                    product_id: i.product_id,
                    product_name: i.product_name,
                    price: i.price,
                    quantity: i.quantity,
                })
                .collect(),
            discounts: self
                .discounts
                .into_iter()
                .map(|d| OrderDiscountDto {
                    discount_id: d.discount_id,
                    amount: d.amount,
                })
                .collect(),
            subtotal: self.subtotal,
            discount_total: self.discount_total,
            delivery_fee: self.delivery_fee,
            total: self.total,
            delivery_method: self.delivery_method.as_str().to_string(),
            delivery_type: self.delivery_type.as_str().to_string(),
            delivery_status_log: self.status_log.into_dto(),
            courier_tracking_url: self.courier_tracking_url,
            note: self.note,
            is_paid: self.is_paid,
            payment_id: self.payment_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Delivery view of the order.
    pub fn into_delivery_dto(self) -> DeliveryDto {
        DeliveryDto {
            order_id: self.id,
            order_status: self.status.as_str().to_string(),
            delivery_method: self.delivery_method.as_str().to_string(),
            delivery_type: self.delivery_type.as_str().to_string(),
            status_log: self.status_log.into_dto(),
            courier_delivery_id: self.courier_delivery_id,
            tracking_url: self.courier_tracking_url,
        }
    }
}

/// Checkout request after parsing.
#[derive(Debug, Clone)]
pub struct CreateOrderParams {
    pub user_id: i32,
    pub cart_item_ids: Vec<i32>,
    pub address_id: i32,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    pub discount_ids: Vec<i32>,
    pub card_id: Option<i32>,
    pub note: Option<String>,
}

impl CreateOrderParams {
    pub fn from_dto(user_id: i32, dto: CreateOrderDto) -> Result<Self, String> {
        Ok(Self {
            user_id,
            cart_item_ids: dto.cart_item_ids,
            address_id: dto.address_id,
            payment_method: dto.payment_method.parse()?,
            delivery_method: dto.delivery_method.parse()?,
            discount_ids: dto.discount_ids,
            card_id: dto.card_id,
            note: dto.note.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Delivery prices available for one shop group of a checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopQuote {
    pub shop_id: i32,
    pub subtotal: i64,
    pub delivery_options: Vec<DeliveryQuote>,
}

impl ShopQuote {
    pub fn into_dto(self) -> ShopQuoteDto {
        ShopQuoteDto {
            shop_id: self.shop_id,
            subtotal: self.subtotal,
            delivery_options: self
                .delivery_options
                .into_iter()
                .map(DeliveryQuote::into_dto)
                .collect(),
        }
    }
}

/// Row values for inserting one shop's order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub tracking_id: String,
    pub user_id: i32,
    pub shop_id: i32,
    pub address_id: i32,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItem>,
    pub discounts: Vec<OrderDiscount>,
    pub subtotal: i64,
    pub discount_total: i64,
    pub delivery_fee: i64,
    pub delivery_method: DeliveryMethod,
    pub note: Option<String>,
}

/// Delivery-related columns written together by orchestration.
#[derive(Debug, Clone)]
pub struct DeliveryStateUpdate {
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub status_log: StatusLog,
    pub courier_delivery_id: Option<String>,
    pub courier_tracking_url: Option<String>,
    pub is_paid: bool,
}

impl DeliveryStateUpdate {
    /// Starts from the order's current values.
    pub fn from_order(order: &Order) -> Self {
        Self {
            status: order.status,
            delivery_type: order.delivery_type,
            status_log: order.status_log.clone(),
            courier_delivery_id: order.courier_delivery_id.clone(),
            courier_tracking_url: order.courier_tracking_url.clone(),
            is_paid: order.is_paid,
        }
    }

    /// Starts a new dispatch attempt.
    ///
    /// The log of an earlier attempt that was cancelled or failed is dropped so
    /// the last logged status always describes the current attempt.
    pub fn begin_dispatch(&mut self, delivery_type: DeliveryType) {
        self.delivery_type = delivery_type;
        self.status_log = StatusLog::default();
    }

    /// Moves the order to follow a delivery status.
    ///
    /// - `COMPLETED`: order completed and paid (cash is collected on delivery)
    /// - `RETURNED`: order returned
    /// - `CANCELED`/`FAILED`: dispatch undone, order back to `CONFIRMED` with
    ///   delivery type `NONE` and the tracking URL cleared. The courier delivery
    ///   id stays so late callbacks for that booking still find the order.
    /// - anything else: order stays in `DELIVERY`
    pub fn follow(&mut self, status: DeliveryStatus) {
        match status {
            DeliveryStatus::Completed => {
                self.status = OrderStatus::Completed;
                self.is_paid = true;
            }
            DeliveryStatus::Returned => self.status = OrderStatus::Returned,
            DeliveryStatus::Canceled | DeliveryStatus::Failed => {
                self.status = OrderStatus::Confirmed;
                self.delivery_type = DeliveryType::None;
                self.courier_tracking_url = None;
            }
            _ => self.status = OrderStatus::Delivery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatched() -> DeliveryStateUpdate {
        DeliveryStateUpdate {
            status: OrderStatus::Delivery,
            delivery_type: DeliveryType::Grab,
            status_log: StatusLog::default(),
            courier_delivery_id: Some("IN-1".to_string()),
            courier_tracking_url: Some("https://track".to_string()),
            is_paid: false,
        }
    }

    #[test]
    fn completion_marks_paid() {
        let mut update = dispatched();
        update.follow(DeliveryStatus::Completed);
        assert_eq!(update.status, OrderStatus::Completed);
        assert!(update.is_paid);
    }

    /// Tests undoing a dispatch after the courier cancels or fails.
    ///
    /// Expected: order back to CONFIRMED, type NONE, tracking URL cleared and
    /// the courier delivery id kept
    #[test]
    fn cancellation_resets_dispatch() {
        for status in [DeliveryStatus::Canceled, DeliveryStatus::Failed] {
            let mut update = dispatched();
            update.follow(status);
            assert_eq!(update.status, OrderStatus::Confirmed);
            assert_eq!(update.delivery_type, DeliveryType::None);
            assert_eq!(update.courier_delivery_id.as_deref(), Some("IN-1"));
            assert!(update.courier_tracking_url.is_none());
            assert!(!update.is_paid);
        }
    }

    /// Tests starting a new dispatch after a failed one.
    ///
    /// Expected: type set and the previous attempt's log dropped
    #[test]
    fn dispatch_starts_new_log() {
        let mut update = dispatched();
        update.status_log.apply(DeliveryStatus::InDelivery, Utc::now());
        update.status_log.apply(DeliveryStatus::Failed, Utc::now());
        update.follow(DeliveryStatus::Failed);

        update.begin_dispatch(DeliveryType::SelfDelivery);
        update.status_log.apply(DeliveryStatus::InDelivery, Utc::now());

        assert_eq!(update.delivery_type, DeliveryType::SelfDelivery);
        assert_eq!(update.status_log.entries().len(), 1);
        assert_eq!(update.status_log.last_status(), Some(DeliveryStatus::InDelivery));
    }

    #[test]
    fn in_flight_statuses_keep_delivery() {
        let mut update = dispatched();
        update.follow(DeliveryStatus::PickingUp);
        assert_eq!(update.status, OrderStatus::Delivery);
        assert_eq!(update.delivery_type, DeliveryType::Grab);

        update.follow(DeliveryStatus::Returned);
        assert_eq!(update.status, OrderStatus::Returned);
    }
}
