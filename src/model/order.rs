use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::model::delivery::StatusLogEntryDto;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteRequestDto {
    pub cart_item_ids: Vec<i32>,
    pub address_id: i32,
}

/// Delivery price offered for one shop group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryQuoteDto {
    /// `SELF` or `GRAB`
    pub method: String,
    pub fee: i64,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShopQuoteDto {
    pub shop_id: i32,
    pub subtotal: i64,
    pub delivery_options: Vec<DeliveryQuoteDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuoteDto {
    pub shops: Vec<ShopQuoteDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderDto {
    pub cart_item_ids: Vec<i32>,
    pub address_id: i32,
    /// `COD`, `CARD` or `GATEWAY`
    pub payment_method: String,
    /// `SELF` or `GRAB`
    pub delivery_method: String,
    #[serde(default)]
    pub discount_ids: Vec<i32>,
    pub card_id: Option<i32>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItemDto {
    pub product_id: i32,
    pub product_name: String,
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderDiscountDto {
    pub discount_id: i32,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderDto {
    pub id: i32,
    pub tracking_id: String,
    pub user_id: i32,
    pub shop_id: i32,
    pub address_id: i32,
    pub payment_method: String,
    pub status: String,
    pub items: Vec<OrderItemDto>,
    pub discounts: Vec<OrderDiscountDto>,
    pub subtotal: i64,
    pub discount_total: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub delivery_method: String,
    pub delivery_type: String,
    pub delivery_status_log: Vec<StatusLogEntryDto>,
    pub courier_tracking_url: Option<String>,
    pub note: Option<String>,
    pub is_paid: bool,
    pub payment_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponseDto {
    pub orders: Vec<OrderDto>,
    /// Hosted payment page for `GATEWAY` orders
    pub payment_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderStatusQuery {
    /// Filter by order status
    pub status: Option<String>,
}
