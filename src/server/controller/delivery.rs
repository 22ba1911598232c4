use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::ErrorDto,
        delivery::{
            CourierWebhookDto, DeliveryDto, DeliveryOptionDto, UpdateSelfDeliveryDto,
            UpsertDeliveryOptionDto,
        },
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::{
            delivery::{DeliveryStatus, UpsertDeliveryOptionParams},
            user::User,
        },
        service::delivery::DeliveryService,
        state::AppState,
    },
};

/// Tag for grouping delivery endpoints in OpenAPI documentation
pub static DELIVERY_TAG: &str = "delivery";

fn service(state: &AppState) -> DeliveryService<'_> {
    DeliveryService::new(&state.db, state.geocoder(), state.courier())
}

fn parse_status(status: &str) -> Result<DeliveryStatus, AppError> {
    status.parse().map_err(AppError::BadRequest)
}

/// A shop's self-delivery tariff.
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/delivery-option",
    tag = DELIVERY_TAG,
    params(("shop_id" = i32, Path, description = "Shop user ID")),
    responses(
        (status = 200, description = "Self-delivery tariff", body = DeliveryOptionDto),
        (status = 400, description = "Shop does not self-deliver", body = ErrorDto)
    ),
)]
pub async fn get_delivery_option(
    State(state): State<AppState>,
    Path(shop_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let option = service(&state).get_option(shop_id).await?;

    Ok(Json(option.into_dto()))
}

/// Create or replace the authenticated shop's self-delivery tariff.
///
/// The pickup address must be one of the shop's own addresses and is geocoded
/// if it has no coordinates yet.
///
/// # Access Control
/// - `Shop`
///
/// # Returns
/// - `200 OK` - Saved tariff
/// - `400 Bad Request` - Negative fees, non-positive range, foreign or unlocatable pickup address
#[utoipa::path(
    put,
    path = "/api/shop/delivery-option",
    tag = DELIVERY_TAG,
    request_body = UpsertDeliveryOptionDto,
    responses(
        (status = 200, description = "Tariff saved", body = DeliveryOptionDto),
        (status = 400, description = "Invalid tariff", body = ErrorDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn upsert_delivery_option(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpsertDeliveryOptionDto>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let option = service(&state)
        .upsert_option(UpsertDeliveryOptionParams::from_dto(shop.id, payload))
        .await?;

    Ok(Json(option.into_dto()))
}

/// Delivery state of an order: type, status log and courier tracking.
///
/// # Access Control
/// - The order's customer or shop
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}/delivery",
    tag = DELIVERY_TAG,
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Delivery state", body = DeliveryDto),
        (status = 404, description = "Order not found or not visible", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn get_delivery(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let order = service(&state).get_delivery(order_id, user.id).await?;

    Ok(Json(order.into_delivery_dto()))
}

/// Dispatch a confirmed order with the shop's own rider.
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/delivery/self",
    tag = DELIVERY_TAG,
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Self-delivery started", body = DeliveryDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 404, description = "Order not found", body = ErrorDto),
        (status = 409, description = "Order not confirmed or already dispatched", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn start_self_delivery(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let order = service(&state).start_self(order_id, shop.id).await?;

    Ok(Json(order.into_delivery_dto()))
}

/// Report progress of a self-delivery.
///
/// `COMPLETED` completes the order, `RETURNED` marks it returned and `FAILED`
/// puts it back to confirmed so it can be dispatched again.
#[utoipa::path(
    patch,
    path = "/api/orders/{order_id}/delivery/self",
    tag = DELIVERY_TAG,
    params(("order_id" = i32, Path, description = "Order ID")),
    request_body = UpdateSelfDeliveryDto,
    responses(
        (status = 200, description = "Delivery updated", body = DeliveryDto),
        (status = 400, description = "Status not allowed for self-delivery", body = ErrorDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 409, description = "Order is not self-delivered", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn update_self_delivery(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i32>,
    Json(payload): Json<UpdateSelfDeliveryDto>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;
    let status = parse_status(&payload.status)?;

    let order = service(&state)
        .update_self(order_id, shop.id, status)
        .await?;

    Ok(Json(order.into_delivery_dto()))
}

/// Book the courier for a confirmed order.
///
/// # Returns
/// - `200 OK` - Booking created, order out for delivery
/// - `400 Bad Request` - Courier not configured or an address cannot be located
/// - `409 Conflict` - Order not confirmed or already dispatched
/// - `502 Bad Gateway` - Courier API call failed
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/delivery/courier",
    tag = DELIVERY_TAG,
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Courier booked", body = DeliveryDto),
        (status = 400, description = "Courier unavailable for this order", body = ErrorDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 409, description = "Order not confirmed or already dispatched", body = ErrorDto),
        (status = 502, description = "Courier API error", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn book_courier(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let order = service(&state).book_courier(order_id, shop.id).await?;

    Ok(Json(order.into_delivery_dto()))
}

/// Poll the courier for the booking's current status.
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/delivery/courier/refresh",
    tag = DELIVERY_TAG,
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Delivery reconciled", body = DeliveryDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 409, description = "Order has no courier booking", body = ErrorDto),
        (status = 502, description = "Courier API error", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn refresh_courier(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let order = service(&state).refresh_courier(order_id, shop.id).await?;

    Ok(Json(order.into_delivery_dto()))
}

/// Cancel the courier booking and return the order to confirmed.
#[utoipa::path(
    delete,
    path = "/api/orders/{order_id}/delivery/courier",
    tag = DELIVERY_TAG,
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = DeliveryDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 409, description = "Order has no active courier booking", body = ErrorDto),
        (status = 502, description = "Courier API error", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn cancel_courier(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let order = service(&state).cancel_courier(order_id, shop.id).await?;

    Ok(Json(order.into_delivery_dto()))
}

/// Status push from the courier.
///
/// Applies the same reconciliation as a refresh to the order holding this
/// booking.
#[utoipa::path(
    post,
    path = "/api/webhooks/courier",
    tag = DELIVERY_TAG,
    request_body = CourierWebhookDto,
    responses(
        (status = 200, description = "Delivery reconciled", body = DeliveryDto),
        (status = 400, description = "Unknown status", body = ErrorDto),
        (status = 404, description = "Unknown delivery id", body = ErrorDto)
    ),
)]
pub async fn courier_webhook(
    State(state): State<AppState>,
    Json(payload): Json<CourierWebhookDto>,
) -> Result<impl IntoResponse, AppError> {
    let status = parse_status(&payload.status)?;

    tracing::info!(
        "Courier webhook for delivery {}: {}",
        payload.delivery_id,
        status.as_str()
    );

    let order = service(&state)
        .courier_webhook(&payload.delivery_id, status, payload.tracking_url)
        .await?;

    Ok(Json(order.into_delivery_dto()))
}
