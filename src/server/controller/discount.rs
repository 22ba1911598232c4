use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::ErrorDto,
        discount::{CreateDiscountDto, DiscountDto, SaveVoucherDto, UpdateDiscountDto, VoucherDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::{
            discount::{CreateDiscountParams, Discount, UpdateDiscountParams, Voucher},
            user::User,
        },
        service::discount::DiscountService,
        state::AppState,
    },
};

/// Tag for grouping discount endpoints in OpenAPI documentation
pub static DISCOUNT_TAG: &str = "discount";

/// Create a discount for the authenticated shop.
///
/// Codes are upper-cased and must be unique within the shop. Percentage
/// discounts take a value of 1 to 100; fixed discounts a positive amount.
///
/// # Access Control
/// - `Shop` - Discounts always belong to the calling shop
///
/// # Returns
/// - `201 Created` - Discount created
/// - `400 Bad Request` - Invalid kind, value or validity window
/// - `409 Conflict` - Code already used by this shop
#[utoipa::path(
    post,
    path = "/api/discounts",
    tag = DISCOUNT_TAG,
    request_body = CreateDiscountDto,
    responses(
        (status = 201, description = "Discount created", body = DiscountDto),
        (status = 400, description = "Invalid discount data", body = ErrorDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 409, description = "Code already in use", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn create_discount(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateDiscountDto>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;
    let params = CreateDiscountParams::from_dto(shop.id, payload).map_err(AppError::BadRequest)?;

    let discount = DiscountService::new(&state.db).create(params).await?;

    Ok((StatusCode::CREATED, Json(discount.into_dto())))
}

/// All of the authenticated shop's discounts, including inactive ones.
#[utoipa::path(
    get,
    path = "/api/discounts/mine",
    tag = DISCOUNT_TAG,
    responses(
        (status = 200, description = "The shop's discounts", body = Vec<DiscountDto>),
        (status = 403, description = "Caller is not a shop", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn list_own_discounts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let discounts = DiscountService::new(&state.db).list_own(shop.id).await?;

    Ok(Json(
        discounts
            .into_iter()
            .map(Discount::into_dto)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/discounts/{discount_id}",
    tag = DISCOUNT_TAG,
    params(("discount_id" = i32, Path, description = "Discount ID")),
    request_body = UpdateDiscountDto,
    responses(
        (status = 200, description = "Discount updated", body = DiscountDto),
        (status = 400, description = "Invalid discount data", body = ErrorDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 404, description = "Discount not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn update_discount(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(discount_id): Path<i32>,
    Json(payload): Json<UpdateDiscountDto>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let discount = DiscountService::new(&state.db)
        .update(discount_id, shop.id, UpdateDiscountParams::from_dto(payload))
        .await?;

    Ok(Json(discount.into_dto()))
}

#[utoipa::path(
    delete,
    path = "/api/discounts/{discount_id}",
    tag = DISCOUNT_TAG,
    params(("discount_id" = i32, Path, description = "Discount ID")),
    responses(
        (status = 204, description = "Discount deleted"),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 404, description = "Discount not found", body = ErrorDto),
        (status = 409, description = "Discount has been redeemed", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn delete_discount(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(discount_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    DiscountService::new(&state.db)
        .delete(discount_id, shop.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Discounts a shop currently offers: active and inside their validity window.
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/discounts",
    tag = DISCOUNT_TAG,
    params(("shop_id" = i32, Path, description = "Shop user ID")),
    responses(
        (status = 200, description = "Live discounts", body = Vec<DiscountDto>),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_shop_discounts(
    State(state): State<AppState>,
    Path(shop_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let discounts = DiscountService::new(&state.db).list_for_shop(shop_id).await?;

    Ok(Json(
        discounts
            .into_iter()
            .map(Discount::into_dto)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/vouchers",
    tag = DISCOUNT_TAG,
    responses(
        (status = 200, description = "Saved vouchers", body = Vec<VoucherDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn list_vouchers(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let vouchers = DiscountService::new(&state.db).list_vouchers(user.id).await?;

    Ok(Json(
        vouchers
            .into_iter()
            .map(Voucher::into_dto)
            .collect::<Vec<_>>(),
    ))
}

/// Save a shop's discount as a voucher. Saving it again returns the existing voucher.
#[utoipa::path(
    post,
    path = "/api/vouchers",
    tag = DISCOUNT_TAG,
    request_body = SaveVoucherDto,
    responses(
        (status = 201, description = "Voucher saved", body = VoucherDto),
        (status = 404, description = "Discount not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn save_voucher(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<SaveVoucherDto>,
) -> Result<impl IntoResponse, AppError> {
    let voucher = DiscountService::new(&state.db)
        .save_voucher(user.id, payload.discount_id)
        .await?;

    Ok((StatusCode::CREATED, Json(voucher.into_dto())))
}

#[utoipa::path(
    delete,
    path = "/api/vouchers/{voucher_id}",
    tag = DISCOUNT_TAG,
    params(("voucher_id" = i32, Path, description = "Voucher ID")),
    responses(
        (status = 204, description = "Voucher removed"),
        (status = 404, description = "Voucher not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn remove_voucher(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(voucher_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    DiscountService::new(&state.db)
        .remove_voucher(user.id, voucher_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
