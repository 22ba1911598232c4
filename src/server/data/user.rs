//! User data repository for database operations.
//!
//! This module provides the `UserRepository` for managing account records, including
//! credential lookups used by login and the uniqueness checks used by registration.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QuerySelect,
};
use std::collections::HashMap;

use crate::server::model::user::{CreateUserParams, Role, UpdateUserParams, User};

/// Repository providing database operations for user management.
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a new user.
    ///
    /// # Returns
    /// - `Ok(User)` - The created user
    /// - `Err(DbErr)` - Database error, including unique constraint violations
    pub async fn create(&self, params: CreateUserParams) -> Result<User, DbErr> {
        let entity = entity::user::ActiveModel {
            username: ActiveValue::Set(params.username),
            email: ActiveValue::Set(params.email),
            phone: ActiveValue::Set(params.phone),
            password_hash: ActiveValue::Set(params.password_hash),
            role: ActiveValue::Set(params.role.as_str().to_string()),
            display_name: ActiveValue::Set(params.display_name),
            bio: ActiveValue::Set(None),
            avatar_url: ActiveValue::Set(None),
            phone_verified: ActiveValue::Set(false),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        User::from_entity(entity)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, DbErr> {
        entity::prelude::User::find_by_id(id)
            .one(self.db)
            .await?
            .map(User::from_entity)
            .transpose()
    }

    /// Finds a user by username or email together with the stored password hash.
    ///
    /// # Returns
    /// - `Ok(Some((User, hash)))` - User matched the identifier
    /// - `Ok(None)` - No user with that username or email
    pub async fn find_credentials(&self, identifier: &str) -> Result<Option<(User, String)>, DbErr> {
        let Some(entity) = entity::prelude::User::find()
            .filter(
                Condition::any()
                    .add(entity::user::Column::Username.eq(identifier))
                    .add(entity::user::Column::Email.eq(identifier.to_lowercase())),
            )
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let hash = entity.password_hash.clone();
        Ok(Some((User::from_entity(entity)?, hash)))
    }

    /// Returns which of username, email or phone are already taken.
    ///
    /// # Returns
    /// - `Ok(Some(field))` - Name of the first conflicting field
    /// - `Ok(None)` - All values are free
    pub async fn find_conflict(
        &self,
        username: &str,
        email: &str,
        phone: Option<&str>,
    ) -> Result<Option<&'static str>, DbErr> {
        let mut condition = Condition::any()
            .add(entity::user::Column::Username.eq(username))
            .add(entity::user::Column::Email.eq(email));
        if let Some(phone) = phone {
            condition = condition.add(entity::user::Column::Phone.eq(phone));
        }

        let existing = entity::prelude::User::find()
            .filter(condition)
            .all(self.db)
            .await?;

        let conflict = existing.iter().find_map(|u| {
            if u.username == username {
                Some("username")
            } else if u.email == email {
                Some("email")
            } else if phone.is_some() && u.phone.as_deref() == phone {
                Some("phone")
            } else {
                None
            }
        });

        Ok(conflict)
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DbErr> {
        entity::prelude::User::find()
            .filter(entity::user::Column::Phone.eq(phone))
            .one(self.db)
            .await?
            .map(User::from_entity)
            .transpose()
    }

    /// Applies profile changes; `None` fields are left untouched.
    ///
    /// # Returns
    /// - `Ok(Some(User))` - Updated user
    /// - `Ok(None)` - User does not exist
    pub async fn update_profile(
        &self,
        id: i32,
        params: UpdateUserParams,
    ) -> Result<Option<User>, DbErr> {
        let Some(entity) = entity::prelude::User::find_by_id(id).one(self.db).await? else {
            return Ok(None);
        };

        let mut active: entity::user::ActiveModel = entity.into();
        if let Some(display_name) = params.display_name {
            active.display_name = ActiveValue::Set(display_name);
        }
        if let Some(bio) = params.bio {
            active.bio = ActiveValue::Set(Some(bio));
        }
        if let Some(avatar_url) = params.avatar_url {
            active.avatar_url = ActiveValue::Set(Some(avatar_url));
        }

        let entity = active.update(self.db).await?;
        Ok(Some(User::from_entity(entity)?))
    }

    /// Stores a verified phone number for the user.
    pub async fn set_verified_phone(&self, id: i32, phone: &str) -> Result<Option<User>, DbErr> {
        let Some(entity) = entity::prelude::User::find_by_id(id).one(self.db).await? else {
            return Ok(None);
        };

        let mut active: entity::user::ActiveModel = entity.into();
        active.phone = ActiveValue::Set(Some(phone.to_string()));
        active.phone_verified = ActiveValue::Set(true);

        let entity = active.update(self.db).await?;
        Ok(Some(User::from_entity(entity)?))
    }

    /// Maps user IDs to display names for the given IDs.
    pub async fn display_names(&self, ids: Vec<i32>) -> Result<HashMap<i32, String>, DbErr> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, String)> = entity::prelude::User::find()
            .select_only()
            .column(entity::user::Column::Id)
            .column(entity::user::Column::DisplayName)
            .filter(entity::user::Column::Id.is_in(ids))
            .into_tuple()
            .all(self.db)
            .await?;

        Ok(rows.into_iter().collect())
    }

    /// IDs of all users with the given role.
    pub async fn ids_by_role(&self, role: Role) -> Result<Vec<i32>, DbErr> {
        entity::prelude::User::find()
            .select_only()
            .column(entity::user::Column::Id)
            .filter(entity::user::Column::Role.eq(role.as_str()))
            .into_tuple()
            .all(self.db)
            .await
    }
}
