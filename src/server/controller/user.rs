use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::ErrorDto,
        user::{ProfileDto, UpdateUserDto, UserDto},
    },
    server::{
        error::AppError,
        model::user::{UpdateUserParams, User},
        service::user::UserService,
        state::AppState,
    },
};

/// Tag for grouping user endpoints in OpenAPI documentation
pub static USER_TAG: &str = "user";

/// GET /api/users/me - Get the authenticated user
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = USER_TAG,
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn get_me(Extension(user): Extension<User>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user.into_dto()))
}

/// PATCH /api/users/me - Update display name, bio or avatar
///
/// Fields left out of the body keep their current value. An empty display name
/// is rejected.
#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = USER_TAG,
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Invalid profile data", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateUserDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserService::new(&state.db)
        .update_me(user.id, UpdateUserParams::from_dto(payload))
        .await?;

    Ok(Json(user.into_dto()))
}

/// GET /api/users/{user_id} - Public profile with follower, following and video counts
///
/// # Authentication
/// Optional. When signed in, `is_following` reflects the caller's follow.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = USER_TAG,
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public profile", body = ProfileDto),
        (status = 404, description = "User not found", body = ErrorDto)
    ),
)]
pub async fn get_profile(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let viewer_id = viewer.map(|Extension(v)| v.id);

    let profile = UserService::new(&state.db)
        .get_profile(user_id, viewer_id)
        .await?;

    Ok(Json(profile.into_dto()))
}

/// POST /api/users/{user_id}/follow - Follow a user
///
/// Following someone already followed is a no-op.
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/follow",
    tag = USER_TAG,
    params(("user_id" = i32, Path, description = "User to follow")),
    responses(
        (status = 204, description = "Following"),
        (status = 400, description = "Cannot follow yourself", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn follow(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    UserService::new(&state.db).follow(user.id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/{user_id}/follow - Unfollow a user
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/follow",
    tag = USER_TAG,
    params(("user_id" = i32, Path, description = "User to unfollow")),
    responses(
        (status = 204, description = "No longer following"),
        (status = 400, description = "Cannot unfollow yourself", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn unfollow(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    UserService::new(&state.db).unfollow(user.id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
