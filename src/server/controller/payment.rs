use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::collections::HashMap;

use crate::{
    model::{
        api::ErrorDto,
        payment::{AddCardDto, IpnResponseDto, PaymentCardDto, PaymentDto},
    },
    server::{
        error::AppError,
        model::{
            payment::{AddCardParams, PaymentCard},
            user::User,
        },
        service::payment::{card::CardService, PaymentService},
        state::AppState,
    },
};

/// Tag for grouping payment endpoints in OpenAPI documentation
pub static PAYMENT_TAG: &str = "payment";

/// GET /api/payments/cards - The caller's saved cards, default first
#[utoipa::path(
    get,
    path = "/api/payments/cards",
    tag = PAYMENT_TAG,
    responses(
        (status = 200, description = "Saved cards", body = Vec<PaymentCardDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn list_cards(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let cards = CardService::new(&state.db).list(user.id).await?;

    Ok(Json(
        cards
            .into_iter()
            .map(PaymentCard::into_dto)
            .collect::<Vec<_>>(),
    ))
}

/// POST /api/payments/cards - Save a card
///
/// The number must pass the Luhn check and have 12 to 19 digits, and the card
/// must not be expired. Only the brand and last four digits are stored. The
/// first saved card becomes the default.
///
/// # Returns
/// - `201 Created`: Card saved
/// - `400 Bad Request`: Invalid number or expiry
#[utoipa::path(
    post,
    path = "/api/payments/cards",
    tag = PAYMENT_TAG,
    request_body = AddCardDto,
    responses(
        (status = 201, description = "Card saved", body = PaymentCardDto),
        (status = 400, description = "Invalid card number or expiry", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn add_card(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<AddCardDto>,
) -> Result<impl IntoResponse, AppError> {
    let card = CardService::new(&state.db)
        .add(AddCardParams::from_dto(user.id, payload))
        .await?;

    Ok((StatusCode::CREATED, Json(card.into_dto())))
}

#[utoipa::path(
    post,
    path = "/api/payments/cards/{card_id}/default",
    tag = PAYMENT_TAG,
    params(("card_id" = i32, Path, description = "Card ID")),
    responses(
        (status = 200, description = "Card is now the default", body = PaymentCardDto),
        (status = 404, description = "Card not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn set_default_card(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(card_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let card = CardService::new(&state.db)
        .set_default(card_id, user.id)
        .await?;

    Ok(Json(card.into_dto()))
}

/// DELETE /api/payments/cards/{card_id} - Remove a card
///
/// Removing the default card promotes the most recently added remaining card.
#[utoipa::path(
    delete,
    path = "/api/payments/cards/{card_id}",
    tag = PAYMENT_TAG,
    params(("card_id" = i32, Path, description = "Card ID")),
    responses(
        (status = 204, description = "Card removed"),
        (status = 404, description = "Card not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn delete_card(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(card_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    CardService::new(&state.db).delete(card_id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/payments/{payment_id}",
    tag = PAYMENT_TAG,
    params(("payment_id" = i32, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "The payment", body = PaymentDto),
        (status = 404, description = "Payment not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(payment_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let payment = PaymentService::new(&state.db, state.payment.as_ref())
        .get_payment(payment_id, user.id)
        .await?;

    Ok(Json(payment.into_dto()))
}

/// GET /api/payments/gateway/return - Browser return from the hosted payment page
///
/// Verifies the signed query string and settles the payment if it is still
/// pending. Repeating the request returns the already settled payment.
///
/// # Returns
/// - `200 OK`: The settled payment
/// - `400 Bad Request`: Signature mismatch or amount mismatch
/// - `404 Not Found`: Unknown transaction reference
#[utoipa::path(
    get,
    path = "/api/payments/gateway/return",
    tag = PAYMENT_TAG,
    responses(
        (status = 200, description = "Settled payment", body = PaymentDto),
        (status = 400, description = "Invalid signature or amount", body = ErrorDto),
        (status = 404, description = "Unknown transaction", body = ErrorDto)
    ),
)]
pub async fn gateway_return(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let payment = PaymentService::new(&state.db, state.payment.as_ref())
        .gateway_return(&query)
        .await?;

    Ok(Json(payment.into_dto()))
}

/// GET /api/payments/gateway/ipn - Server-to-server payment notification
///
/// Always answers 200; the outcome is reported in `RspCode` as the gateway
/// expects.
#[utoipa::path(
    get,
    path = "/api/payments/gateway/ipn",
    tag = PAYMENT_TAG,
    responses(
        (status = 200, description = "Acknowledgement for the gateway", body = IpnResponseDto)
    ),
)]
pub async fn gateway_ipn(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let response = PaymentService::new(&state.db, state.payment.as_ref())
        .gateway_ipn(&query)
        .await;

    Json(response)
}
