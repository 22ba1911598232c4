use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

/// Errors raised by delivery orchestration.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Drop-off lies beyond the shop's self-delivery radius.
    #[error("Address is {distance_km:.2} km away, beyond the {max_distance_km} km delivery range")]
    OutOfRange {
        distance_km: f64,
        max_distance_km: f64,
    },

    /// Address coordinates could not be resolved.
    #[error("Unable to locate address: {0}")]
    AddressNotLocated(String),

    /// Shop has not configured self-delivery.
    #[error("Shop {0} does not offer self-delivery")]
    SelfDeliveryUnavailable(i32),

    /// Courier credentials are not configured.
    #[error("Courier delivery is not available")]
    CourierUnavailable,

    /// Operation does not fit the order's current delivery state.
    #[error("{0}")]
    InvalidState(String),

    /// Courier API responded with an error or an unexpected body.
    #[error("Courier request failed: {0}")]
    Courier(String),

    /// Geocoding API responded with an error or an unexpected body.
    #[error("Geocoding request failed: {0}")]
    Geocoding(String),
}

/// Converts delivery errors into HTTP responses.
///
/// - `OutOfRange` / `AddressNotLocated` / `SelfDeliveryUnavailable` / `CourierUnavailable` → 400
/// - `InvalidState` → 409 Conflict
/// - `Courier` / `Geocoding` → 502 Bad Gateway, details logged
impl IntoResponse for DeliveryError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::OutOfRange { .. }
            | Self::AddressNotLocated(_)
            | Self::SelfDeliveryUnavailable(_)
            | Self::CourierUnavailable => StatusCode::BAD_REQUEST,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::Courier(_) | Self::Geocoding(_) => {
                tracing::error!("{}", self);
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorDto {
                        error: "Delivery provider is unavailable, please try again later"
                            .to_string(),
                    }),
                )
                    .into_response();
            }
        };

        (
            status,
            Json(ErrorDto {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
