use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Request to a protected route carried no bearer token.
    #[error("Request is missing a bearer token")]
    MissingToken,

    /// Bearer token is unknown or has expired.
    #[error("Bearer token is invalid or expired")]
    InvalidToken,

    /// Username/email and password combination did not match a user.
    ///
    /// The message is deliberately identical for unknown users and wrong
    /// passwords.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated user lacks the role required for the operation.
    ///
    /// # Fields
    /// - User ID
    /// - Description of the denied action for logs
    #[error("User {0} denied access: {1}")]
    AccessDenied(i32, String),

    /// OTP code did not match or expired.
    #[error("Invalid or expired verification code")]
    InvalidOtp,

    /// Stored password hash could not be parsed.
    #[error("Failed to process password hash: {0}")]
    PasswordHash(String),
}

/// Converts authentication errors into HTTP responses.
///
/// - `MissingToken` / `InvalidToken` / `InvalidCredentials` → 401 Unauthorized
/// - `AccessDenied` → 403 Forbidden with a generic message, details logged
/// - `InvalidOtp` → 400 Bad Request
/// - `PasswordHash` → 500 Internal Server Error
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MissingToken | Self::InvalidToken | Self::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Self::AccessDenied(_, _) => {
                tracing::debug!("{}", self);
                (
                    StatusCode::FORBIDDEN,
                    "You do not have permission to perform this action".to_string(),
                )
            }
            Self::InvalidOtp => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::PasswordHash(_) => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorDto { error: message })).into_response()
    }
}
