use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        address::{AddressDto, CreateAddressDto, UpdateAddressDto},
        api::ErrorDto,
    },
    server::{
        error::AppError,
        model::{
            address::{CreateAddressParams, UpdateAddressParams},
            user::User,
        },
        service::address::AddressService,
        state::AppState,
    },
};

/// Tag for grouping address endpoints in OpenAPI documentation
pub static ADDRESS_TAG: &str = "address";

/// List the authenticated user's addresses, default first.
#[utoipa::path(
    get,
    path = "/api/addresses",
    tag = ADDRESS_TAG,
    responses(
        (status = 200, description = "Saved addresses", body = Vec<AddressDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let addresses = AddressService::new(&state.db, state.geocoder())
        .list(user.id)
        .await?;

    Ok(Json(
        addresses
            .into_iter()
            .map(|a| a.into_dto())
            .collect::<Vec<_>>(),
    ))
}

/// Save a delivery address.
///
/// Coordinates may be supplied by the client; otherwise the address text is
/// geocoded when a geocoder is configured. The user's first address becomes
/// their default.
///
/// # Returns
/// - `201 Created` - Address saved
/// - `400 Bad Request` - Missing name, phone or address text
#[utoipa::path(
    post,
    path = "/api/addresses",
    tag = ADDRESS_TAG,
    request_body = CreateAddressDto,
    responses(
        (status = 201, description = "Address saved", body = AddressDto),
        (status = 400, description = "Invalid address", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn create_address(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateAddressDto>,
) -> Result<impl IntoResponse, AppError> {
    let address = AddressService::new(&state.db, state.geocoder())
        .create(CreateAddressParams::from_dto(user.id, payload))
        .await?;

    Ok((StatusCode::CREATED, Json(address.into_dto())))
}

#[utoipa::path(
    patch,
    path = "/api/addresses/{address_id}",
    tag = ADDRESS_TAG,
    params(("address_id" = i32, Path, description = "Address ID")),
    request_body = UpdateAddressDto,
    responses(
        (status = 200, description = "Address updated", body = AddressDto),
        (status = 400, description = "Invalid address", body = ErrorDto),
        (status = 404, description = "Address not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn update_address(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(address_id): Path<i32>,
    Json(payload): Json<UpdateAddressDto>,
) -> Result<impl IntoResponse, AppError> {
    let address = AddressService::new(&state.db, state.geocoder())
        .update(UpdateAddressParams::from_dto(address_id, user.id, payload))
        .await?;

    Ok(Json(address.into_dto()))
}

/// Delete an address.
///
/// When the default address is removed, the most recently created remaining
/// address becomes the default.
#[utoipa::path(
    delete,
    path = "/api/addresses/{address_id}",
    tag = ADDRESS_TAG,
    params(("address_id" = i32, Path, description = "Address ID")),
    responses(
        (status = 204, description = "Address deleted"),
        (status = 404, description = "Address not found", body = ErrorDto),
        (status = 409, description = "Address is referenced by orders", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn delete_address(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(address_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AddressService::new(&state.db, state.geocoder())
        .delete(address_id, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/addresses/{address_id}/default",
    tag = ADDRESS_TAG,
    params(("address_id" = i32, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address is now the default", body = AddressDto),
        (status = 404, description = "Address not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn set_default_address(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(address_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let address = AddressService::new(&state.db, state.geocoder())
        .set_default(address_id, user.id)
        .await?;

    Ok(Json(address.into_dto()))
}
