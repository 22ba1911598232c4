use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentCardDto {
    pub id: i32,
    pub brand: String,
    pub last4: String,
    pub holder_name: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddCardDto {
    pub number: String,
    pub holder_name: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentDto {
    pub id: i32,
    pub method: String,
    pub amount: i64,
    /// `PENDING`, `PAID` or `FAILED`
    pub status: String,
    pub txn_ref: String,
    pub gateway_transaction_no: Option<String>,
    pub response_code: Option<String>,
    pub order_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Body returned to the gateway's server-to-server notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IpnResponseDto {
    #[serde(rename = "RspCode")]
    pub rsp_code: String,
    #[serde(rename = "Message")]
    pub message: String,
}
