//! Account registration, password login and bearer token issuance.
//!
//! Passwords are stored as Argon2id PHC strings. Bearer tokens are random secrets
//! returned once to the client; only their SHA-256 digest is persisted.

pub mod otp;
pub mod sms;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{auth_token::AuthTokenRepository, user::UserRepository},
    error::{auth::AuthError, AppError},
    model::{
        auth::RegisterParams,
        user::{CreateUserParams, User},
    },
    service::auth::{otp::OtpService, sms::SmsSender},
    util::token::{generate_bearer_token, hash_token},
};

pub struct AuthService<'a> {
    db: &'a DatabaseConnection,
    token_ttl_days: i64,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a DatabaseConnection, token_ttl_days: i64) -> Self {
        Self { db, token_ttl_days }
    }

    /// Creates an account and signs it in.
    ///
    /// # Returns
    /// - `Ok((User, String))` - The new user and a bearer token
    /// - `Err(AppError::Conflict)` - Username, email or phone already taken
    pub async fn register(&self, params: RegisterParams) -> Result<(User, String), AppError> {
        let user_repo = UserRepository::new(self.db);

        if let Some(field) = user_repo
            .find_conflict(&params.username, &params.email, params.phone.as_deref())
            .await?
        {
            return Err(AppError::Conflict(format!("The {} is already in use", field)));
        }

        let password_hash = hash_password(&params.password)?;
        let user = user_repo
            .create(CreateUserParams {
                username: params.username,
                email: params.email,
                phone: params.phone,
                password_hash,
                role: params.role,
                display_name: params.display_name,
            })
            .await?;

        tracing::info!("Registered user {} ({})", user.id, user.role);

        let token = self.issue_token(user.id).await?;
        Ok((user, token))
    }

    /// Signs in with a username or email and password.
    ///
    /// Unknown identifiers and wrong passwords produce the same error.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<(User, String), AppError> {
        let identifier = identifier.trim();
        let lookup = if identifier.contains('@') {
            identifier.to_lowercase()
        } else {
            identifier.to_string()
        };

        let Some((user, password_hash)) = UserRepository::new(self.db)
            .find_credentials(&lookup)
            .await?
        else {
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(password, &password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.issue_token(user.id).await?;
        Ok((user, token))
    }

    /// Revokes the given bearer token.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        AuthTokenRepository::new(self.db)
            .delete(&hash_token(token))
            .await?;
        Ok(())
    }

    /// Resolves a bearer token to its user if the token is live.
    pub async fn authenticate(&self, token: &str) -> Result<Option<User>, AppError> {
        let user = AuthTokenRepository::new(self.db)
            .find_user(&hash_token(token), Utc::now())
            .await?;
        Ok(user)
    }

    /// Sends a verification code to the phone.
    pub async fn request_otp(
        &self,
        otp: &OtpService,
        sms: &dyn SmsSender,
        phone: &str,
    ) -> Result<(), AppError> {
        let phone = normalize_phone(phone)?;
        let code = otp.generate(&phone).await;

        sms.send(
            &phone,
            &format!("Your TasteTube verification code is {}", code),
        )
        .await
    }

    /// Verifies the phone for the user if the code matches.
    ///
    /// # Returns
    /// - `Ok(User)` - User with the verified phone
    /// - `Err(AuthError::InvalidOtp)` - Wrong or expired code
    /// - `Err(AppError::Conflict)` - Phone belongs to another account
    pub async fn verify_otp(
        &self,
        otp: &OtpService,
        user: &User,
        phone: &str,
        code: &str,
    ) -> Result<User, AppError> {
        let phone = normalize_phone(phone)?;
        let user_repo = UserRepository::new(self.db);

        if let Some(owner) = user_repo.find_by_phone(&phone).await? {
            if owner.id != user.id {
                return Err(AppError::Conflict(
                    "The phone number is already in use".to_string(),
                ));
            }
        }

        if !otp.validate_and_consume(&phone, code.trim()).await {
            return Err(AuthError::InvalidOtp.into());
        }

        user_repo
            .set_verified_phone(user.id, &phone)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn issue_token(&self, user_id: i32) -> Result<String, AppError> {
        let token = generate_bearer_token();
        let expires_at = Utc::now() + Duration::days(self.token_ttl_days);

        AuthTokenRepository::new(self.db)
            .create(user_id, hash_token(&token), expires_at)
            .await?;

        Ok(token)
    }
}

/// Hashes a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Checks a password against a stored PHC string.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(password_hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Strips spaces and dashes; the result must be 8-15 digits with an optional `+`.
fn normalize_phone(phone: &str) -> Result<String, AppError> {
    let normalized: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let digits = normalized.strip_prefix('+').unwrap_or(&normalized);

    if digits.len() < 8 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("Phone number is invalid".to_string()));
    }

    Ok(normalized)
}
