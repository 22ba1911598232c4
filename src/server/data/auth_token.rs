//! Bearer token persistence.
//!
//! Tokens are stored only as SHA-256 digests; the repository never sees a raw secret.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

use crate::server::model::user::User;

pub struct AuthTokenRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AuthTokenRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        user_id: i32,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        entity::auth_token::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            token_hash: ActiveValue::Set(token_hash),
            created_at: ActiveValue::Set(Utc::now()),
            expires_at: ActiveValue::Set(expires_at),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(())
    }

    /// Resolves a token digest to its user if the token has not expired at `now`.
    pub async fn find_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbErr> {
        let result = entity::prelude::AuthToken::find()
            .filter(entity::auth_token::Column::TokenHash.eq(token_hash))
            .filter(entity::auth_token::Column::ExpiresAt.gt(now))
            .find_also_related(entity::prelude::User)
            .one(self.db)
            .await?;

        result
            .and_then(|(_, user)| user)
            .map(User::from_entity)
            .transpose()
    }

    /// Deletes the token with this digest.
    ///
    /// # Returns
    /// - `Ok(true)` - A token was removed
    /// - `Ok(false)` - No token matched
    pub async fn delete(&self, token_hash: &str) -> Result<bool, DbErr> {
        let result = entity::prelude::AuthToken::delete_many()
            .filter(entity::auth_token::Column::TokenHash.eq(token_hash))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Removes tokens that expired before `now`.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DbErr> {
        let result = entity::prelude::AuthToken::delete_many()
            .filter(entity::auth_token::Column::ExpiresAt.lte(now))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
