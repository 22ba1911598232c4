use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusLogEntryDto {
    pub status: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryOptionDto {
    pub shop_id: i32,
    pub fee_per_km: i64,
    pub min_fee: i64,
    pub max_distance_km: f64,
    pub pickup_address_id: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpsertDeliveryOptionDto {
    pub fee_per_km: i64,
    pub min_fee: i64,
    pub max_distance_km: f64,
    pub pickup_address_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryDto {
    pub order_id: i32,
    pub order_status: String,
    /// Customer's requested method, `SELF` or `GRAB`
    pub delivery_method: String,
    /// Current orchestration type, `NONE`, `SELF` or `GRAB`
    pub delivery_type: String,
    pub status_log: Vec<StatusLogEntryDto>,
    pub courier_delivery_id: Option<String>,
    pub tracking_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateSelfDeliveryDto {
    /// `IN_DELIVERY`, `COMPLETED`, `FAILED` or `RETURNED`
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourierWebhookDto {
    pub delivery_id: String,
    pub status: String,
    pub tracking_url: Option<String>,
}
