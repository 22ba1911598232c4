use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::{ErrorDto, MessageDto},
        auth::{AuthResponseDto, LoginDto, RegisterDto, RequestOtpDto, VerifyOtpDto},
        user::UserDto,
    },
    server::{
        error::{auth::AuthError, AppError},
        middleware::auth::bearer_token,
        model::{auth::RegisterParams, user::User},
        service::auth::AuthService,
        state::AppState,
    },
};

/// Tag for grouping auth endpoints in OpenAPI documentation
pub static AUTH_TAG: &str = "auth";

/// Create an account and sign in.
///
/// Registers a customer or shop account and returns a bearer token for it.
/// Admin accounts cannot be created through this endpoint.
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `payload` - Username, email, password, role and optional profile fields
///
/// # Returns
/// - `201 Created` - Account created, token issued
/// - `400 Bad Request` - Invalid username, email, password or role
/// - `409 Conflict` - Username, email or phone already in use
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = AUTH_TAG,
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Account created", body = AuthResponseDto),
        (status = 400, description = "Invalid registration data", body = ErrorDto),
        (status = 409, description = "Username, email or phone already in use", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterDto>,
) -> Result<impl IntoResponse, AppError> {
    let params = RegisterParams::from_dto(payload).map_err(AppError::BadRequest)?;

    let (user, token) = AuthService::new(&state.db, state.token_ttl_days)
        .register(params)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponseDto {
            token,
            user: user.into_dto(),
        }),
    ))
}

/// Sign in with a username or email and password.
///
/// # Returns
/// - `200 OK` - Token issued
/// - `401 Unauthorized` - Credentials did not match
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = AUTH_TAG,
    request_body = LoginDto,
    responses(
        (status = 200, description = "Signed in", body = AuthResponseDto),
        (status = 401, description = "Invalid credentials", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginDto>,
) -> Result<impl IntoResponse, AppError> {
    let (user, token) = AuthService::new(&state.db, state.token_ttl_days)
        .login(&payload.identifier, &payload.password)
        .await?;

    Ok((
        StatusCode::OK,
        Json(AuthResponseDto {
            token,
            user: user.into_dto(),
        }),
    ))
}

/// Revoke the bearer token used for this request.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = AUTH_TAG,
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = bearer_token(&headers).ok_or(AuthError::MissingToken)?;

    AuthService::new(&state.db, state.token_ttl_days)
        .logout(&token)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Send a phone verification code.
///
/// The code is delivered by SMS when an SMS account is configured and logged
/// otherwise.
#[utoipa::path(
    post,
    path = "/api/auth/otp/request",
    tag = AUTH_TAG,
    request_body = RequestOtpDto,
    responses(
        (status = 200, description = "Code sent", body = MessageDto),
        (status = 400, description = "Invalid phone number", body = ErrorDto)
    ),
)]
pub async fn request_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtpDto>,
) -> Result<impl IntoResponse, AppError> {
    AuthService::new(&state.db, state.token_ttl_days)
        .request_otp(&state.otp, state.sms.as_ref(), &payload.phone)
        .await?;

    Ok(Json(MessageDto {
        message: "Verification code sent".to_string(),
    }))
}

/// Verify the phone number with the code sent to it.
///
/// # Access Control
/// - Authenticated user; the verified phone is attached to their account
///
/// # Returns
/// - `200 OK` - Updated user with `phone_verified = true`
/// - `400 Bad Request` - Wrong or expired code
/// - `409 Conflict` - Phone already verified by another account
#[utoipa::path(
    post,
    path = "/api/auth/otp/verify",
    tag = AUTH_TAG,
    request_body = VerifyOtpDto,
    responses(
        (status = 200, description = "Phone verified", body = UserDto),
        (status = 400, description = "Invalid or expired code", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 409, description = "Phone in use by another account", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<VerifyOtpDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthService::new(&state.db, state.token_ttl_days)
        .verify_otp(&state.otp, &user, &payload.phone, &payload.code)
        .await?;

    Ok(Json(user.into_dto()))
}
