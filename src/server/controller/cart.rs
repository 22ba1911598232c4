use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::ErrorDto,
        cart::{AddCartItemDto, CartDto, UpdateCartItemDto},
    },
    server::{error::AppError, model::user::User, service::cart::CartService, state::AppState},
};

/// Tag for grouping cart endpoints in OpenAPI documentation
pub static CART_TAG: &str = "cart";

/// GET /api/cart - The caller's cart grouped by shop with subtotals
#[utoipa::path(
    get,
    path = "/api/cart",
    tag = CART_TAG,
    responses(
        (status = 200, description = "Cart grouped by shop", body = CartDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let cart = CartService::new(&state.db).get(user.id).await?;

    Ok(Json(cart.into_dto()))
}

/// POST /api/cart/items - Add a product to the cart
///
/// Adding a product already in the cart increases that line's quantity. The
/// resulting quantity may not exceed the product's stock.
///
/// # Returns
/// - `200 OK`: The whole updated cart
/// - `400 Bad Request`: Quantity below 1 or above stock
/// - `404 Not Found`: Unknown product
#[utoipa::path(
    post,
    path = "/api/cart/items",
    tag = CART_TAG,
    request_body = AddCartItemDto,
    responses(
        (status = 200, description = "Updated cart", body = CartDto),
        (status = 400, description = "Invalid quantity", body = ErrorDto),
        (status = 404, description = "Product not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn add_cart_item(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<AddCartItemDto>,
) -> Result<impl IntoResponse, AppError> {
    let cart = CartService::new(&state.db)
        .add(user.id, payload.product_id, payload.quantity)
        .await?;

    Ok(Json(cart.into_dto()))
}

/// PATCH /api/cart/items/{item_id} - Change a line's quantity, zero removes it
#[utoipa::path(
    patch,
    path = "/api/cart/items/{item_id}",
    tag = CART_TAG,
    params(("item_id" = i32, Path, description = "Cart line ID")),
    request_body = UpdateCartItemDto,
    responses(
        (status = 200, description = "Updated cart", body = CartDto),
        (status = 400, description = "Invalid quantity", body = ErrorDto),
        (status = 404, description = "Cart line not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(item_id): Path<i32>,
    Json(payload): Json<UpdateCartItemDto>,
) -> Result<impl IntoResponse, AppError> {
    let cart = CartService::new(&state.db)
        .update(user.id, item_id, payload.quantity)
        .await?;

    Ok(Json(cart.into_dto()))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{item_id}",
    tag = CART_TAG,
    params(("item_id" = i32, Path, description = "Cart line ID")),
    responses(
        (status = 200, description = "Updated cart", body = CartDto),
        (status = 404, description = "Cart line not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(item_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let cart = CartService::new(&state.db).remove(user.id, item_id).await?;

    Ok(Json(cart.into_dto()))
}
