use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiscountDto {
    pub id: i32,
    pub shop_id: i32,
    pub code: String,
    pub description: Option<String>,
    /// `PERCENTAGE` or `FIXED`
    pub kind: String,
    pub value: i64,
    pub max_discount_amount: Option<i64>,
    pub min_order_total: i64,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub max_uses_per_user: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub active: bool,
    pub product_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDiscountDto {
    pub code: String,
    pub description: Option<String>,
    pub kind: String,
    pub value: i64,
    pub max_discount_amount: Option<i64>,
    #[serde(default)]
    pub min_order_total: i64,
    pub max_uses: Option<i32>,
    pub max_uses_per_user: Option<i32>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub product_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateDiscountDto {
    pub description: Option<String>,
    pub value: Option<i64>,
    pub max_discount_amount: Option<i64>,
    pub min_order_total: Option<i64>,
    pub max_uses: Option<i32>,
    pub max_uses_per_user: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub product_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VoucherDto {
    pub id: i32,
    pub discount: DiscountDto,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveVoucherDto {
    pub discount_id: i32,
}
