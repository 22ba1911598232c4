use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::server::{
    error::{auth::AuthError, AppError},
    model::user::{Role, User},
    service::auth::AuthService,
    state::AppState,
};

const BEARER_PREFIX: &str = "Bearer ";

pub enum Permission {
    Shop,
    Admin,
}

/// Extracts the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Rejects requests without a live bearer token.
///
/// On success the token's `User` is inserted into the request extensions.
///
/// # Returns
/// - `Err(AuthError::MissingToken)` - No `Authorization: Bearer` header
/// - `Err(AuthError::InvalidToken)` - Unknown or expired token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AuthError::MissingToken)?;

    let user = AuthService::new(&state.db, state.token_ttl_days)
        .authenticate(&token)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Resolves the bearer token when one is sent, for routes that are public but
/// show more to signed-in users.
///
/// A missing header passes through without a user; a bad token is still rejected.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_token(request.headers()) {
        let user = AuthService::new(&state.db, state.token_ttl_days)
            .authenticate(&token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

pub struct AuthGuard<'a> {
    user: &'a User,
}

impl<'a> AuthGuard<'a> {
    pub fn new(user: &'a User) -> Self {
        Self { user }
    }

    /// Checks the authenticated user against every listed permission.
    ///
    /// Admins pass every check.
    ///
    /// # Returns
    /// - `Ok(&User)` - All permissions satisfied
    /// - `Err(AuthError::AccessDenied)` - First permission the user lacks
    pub fn require(&self, permissions: &[Permission]) -> Result<&'a User, AppError> {
        if self.user.is_admin() {
            return Ok(self.user);
        }

        for permission in permissions {
            match permission {
                Permission::Shop => {
                    if self.user.role != Role::Shop {
                        return Err(AuthError::AccessDenied(
                            self.user.id,
                            "User attempted a shop operation without the shop role".to_string(),
                        )
                        .into());
                    }
                }
                Permission::Admin => {
                    return Err(AuthError::AccessDenied(
                        self.user.id,
                        "User attempted an admin operation without admin permissions"
                            .to_string(),
                    )
                    .into());
                }
            }
        }

        Ok(self.user)
    }
}
