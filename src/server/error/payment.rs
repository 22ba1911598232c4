use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

/// Errors raised by card handling and the hosted payment gateway.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Card number failed length or checksum validation.
    #[error("Invalid card number")]
    InvalidCardNumber,

    /// Card expiry month out of range or already past.
    #[error("Card is expired or has an invalid expiry date")]
    InvalidExpiry,

    /// Gateway callback signature did not verify.
    #[error("Invalid payment signature")]
    InvalidSignature,

    /// Gateway callback amount differs from the recorded payment.
    #[error("Payment amount mismatch for {0}")]
    AmountMismatch(String),

    /// Gateway credentials are not configured.
    #[error("Online payment is not available")]
    GatewayUnavailable,

    /// Gateway URL could not be built.
    #[error("Payment gateway error: {0}")]
    Gateway(String),
}

/// Converts payment errors into HTTP responses.
///
/// - `Gateway` → 502 Bad Gateway, details logged
/// - all other variants → 400 Bad Request
impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        match self {
            Self::Gateway(_) => {
                tracing::error!("{}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorDto {
                        error: "Payment provider is unavailable".to_string(),
                    }),
                )
                    .into_response()
            }
            err => (
                StatusCode::BAD_REQUEST,
                Json(ErrorDto {
                    error: err.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
