use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::ErrorDto,
        order::{
            CreateOrderDto, CreateOrderResponseDto, OrderDto, OrderStatusQuery, QuoteDto,
            QuoteRequestDto,
        },
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::{
            order::{CreateOrderParams, Order, OrderStatus, ShopQuote},
            user::User,
        },
        service::order::OrderService,
        state::AppState,
    },
};

/// Tag for grouping order endpoints in OpenAPI documentation
pub static ORDER_TAG: &str = "order";

const FALLBACK_CLIENT_IP: &str = "127.0.0.1";

fn service(state: &AppState) -> OrderService<'_> {
    OrderService::new(
        &state.db,
        state.geocoder(),
        state.courier(),
        state.payment.as_ref(),
    )
}

/// Client address for the payment gateway, taken from the proxy headers.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(FALLBACK_CLIENT_IP)
        .to_string()
}

fn parse_status(query: OrderStatusQuery) -> Result<Option<OrderStatus>, AppError> {
    query
        .status
        .map(|s| s.parse::<OrderStatus>())
        .transpose()
        .map_err(AppError::BadRequest)
}

fn into_dtos(orders: Vec<Order>) -> Vec<OrderDto> {
    orders.into_iter().map(Order::into_dto).collect()
}

/// Price a checkout before placing it.
///
/// Groups the selected cart lines by shop and returns each shop's subtotal with
/// the delivery options available for the address: `SELF` when the shop
/// delivers that far, `GRAB` when the courier is configured and quotes.
///
/// # Returns
/// - `200 OK` - One quote per shop
/// - `400 Bad Request` - No lines selected or address cannot be located
/// - `404 Not Found` - Address not owned by the caller
#[utoipa::path(
    post,
    path = "/api/orders/quote",
    tag = ORDER_TAG,
    request_body = QuoteRequestDto,
    responses(
        (status = 200, description = "Per-shop quotes", body = QuoteDto),
        (status = 400, description = "Invalid selection", body = ErrorDto),
        (status = 404, description = "Address not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn quote(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<QuoteRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    let quotes = service(&state)
        .quote(user.id, payload.cart_item_ids, payload.address_id)
        .await?;

    Ok(Json(QuoteDto {
        shops: quotes.into_iter().map(ShopQuote::into_dto).collect(),
    }))
}

/// Place a checkout, creating one order per shop.
///
/// Stock and discount usage are reserved, the ordered cart lines removed and
/// the payment recorded according to `payment_method`. `GATEWAY` checkouts
/// return the hosted payment page URL to redirect the customer to.
///
/// # Access Control
/// - Authenticated user; the address, cart lines and card must be theirs
///
/// # Returns
/// - `201 Created` - Orders placed
/// - `400 Bad Request` - Invalid method, missing card, ineligible discount or
///   out-of-range delivery
/// - `409 Conflict` - Insufficient stock or discount exhausted
/// - `502 Bad Gateway` - Courier quote failed
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = ORDER_TAG,
    request_body = CreateOrderDto,
    responses(
        (status = 201, description = "Orders placed", body = CreateOrderResponseDto),
        (status = 400, description = "Invalid checkout", body = ErrorDto),
        (status = 404, description = "Address, card or cart line not found", body = ErrorDto),
        (status = 409, description = "Insufficient stock or exhausted discount", body = ErrorDto),
        (status = 502, description = "Courier unavailable", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(payload): Json<CreateOrderDto>,
) -> Result<impl IntoResponse, AppError> {
    let params = CreateOrderParams::from_dto(user.id, payload).map_err(AppError::BadRequest)?;

    let checkout = service(&state)
        .create(params, &client_ip(&headers))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponseDto {
            orders: into_dtos(checkout.orders),
            payment_url: checkout.payment_url,
        }),
    ))
}

/// The caller's orders as a customer, newest first.
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = ORDER_TAG,
    params(OrderStatusQuery),
    responses(
        (status = 200, description = "Orders placed by the caller", body = Vec<OrderDto>),
        (status = 400, description = "Unknown status filter", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<OrderStatusQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = parse_status(query)?;
    let orders = service(&state).list_mine(user.id, status).await?;

    Ok(Json(into_dtos(orders)))
}

/// Orders received by the authenticated shop, newest first.
#[utoipa::path(
    get,
    path = "/api/shop/orders",
    tag = ORDER_TAG,
    params(OrderStatusQuery),
    responses(
        (status = 200, description = "Orders received by the shop", body = Vec<OrderDto>),
        (status = 400, description = "Unknown status filter", body = ErrorDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn list_shop_orders(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<OrderStatusQuery>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;
    let status = parse_status(query)?;

    let orders = service(&state).list_for_shop(shop.id, status).await?;

    Ok(Json(into_dtos(orders)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    tag = ORDER_TAG,
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "The order", body = OrderDto),
        (status = 404, description = "Order not found or not visible", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let order = service(&state).get(order_id, user.id).await?;

    Ok(Json(order.into_dto()))
}

/// Accept a pending order.
///
/// Orders paid through the gateway can only be confirmed once the payment has
/// settled.
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/confirm",
    tag = ORDER_TAG,
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order confirmed", body = OrderDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 404, description = "Order not found", body = ErrorDto),
        (status = 409, description = "Order not pending or awaiting payment", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn confirm_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let order = service(&state).confirm(order_id, shop.id).await?;

    Ok(Json(order.into_dto()))
}

/// Cancel an order.
///
/// Customers may cancel while the order is pending. The shop may cancel while
/// it is pending or confirmed, or while it is out with the courier, in which
/// case the booking is cancelled first. Stock and discount usage are restored.
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/cancel",
    tag = ORDER_TAG,
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled", body = OrderDto),
        (status = 404, description = "Order not found", body = ErrorDto),
        (status = 409, description = "Order can no longer be cancelled", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let order = service(&state).cancel(order_id, user.id).await?;

    Ok(Json(order.into_dto()))
}

/// Mark a self-delivered order as delivered. Cash-on-delivery orders become paid.
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/complete",
    tag = ORDER_TAG,
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order completed", body = OrderDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 404, description = "Order not found", body = ErrorDto),
        (status = 409, description = "Order is not out for self-delivery", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn complete_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let order = service(&state).complete(order_id, shop.id).await?;

    Ok(Json(order.into_dto()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests client address resolution from proxy headers.
    ///
    /// Expected: first forwarded address, then the real-ip header, then loopback
    #[test]
    fn resolves_client_ip() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "127.0.0.1");

        headers.insert("x-real-ip", "10.0.0.9".parse().unwrap());
        assert_eq!(client_ip(&headers), "10.0.0.9");

        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }
}
