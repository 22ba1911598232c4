//! User domain models and parameters.
//!
//! Provides the authenticated user model with its role, plus parameter types for
//! registration and profile updates.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use std::{fmt, str::FromStr};

use crate::{
    model::user::{ProfileDto, UpdateUserDto, UserDto},
    server::model::invalid_column,
};

/// Account role controlling which operations a user may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Shop,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Shop => "SHOP",
            Self::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Self::Customer),
            "SHOP" => Ok(Self::Shop),
            "ADMIN" => Ok(Self::Admin),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Converts an entity model to a user domain model at the repository boundary.
    ///
    /// # Returns
    /// - `Ok(User)` - The converted user domain model
    /// - `Err(DbErr::Custom)` - Stored role is not a known value
    pub fn from_entity(entity: entity::user::Model) -> Result<Self, DbErr> {
        let role = entity
            .role
            .parse()
            .map_err(|_| invalid_column("user.role", &entity.role))?;

        Ok(Self {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            phone: entity.phone,
            role,
            display_name: entity.display_name,
            bio: entity.bio,
            avatar_url: entity.avatar_url,
            phone_verified: entity.phone_verified,
            created_at: entity.created_at,
        })
    }

    pub fn into_dto(self) -> UserDto {
        UserDto {
            id: self.id,
            username: self.username,
            email: self.email,
            phone: self.phone,
            role: self.role.to_string(),
            display_name: self.display_name,
            bio: self.bio,
            avatar_url: self.avatar_url,
            phone_verified: self.phone_verified,
            created_at: self.created_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Parameters for creating an account.
///
/// `password_hash` is the already-hashed PHC string.
#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub display_name: String,
}

/// Parameters for updating the caller's own profile fields.
///
/// `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserParams {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl UpdateUserParams {
    pub fn from_dto(dto: UpdateUserDto) -> Self {
        Self {
            display_name: dto.display_name,
            bio: dto.bio,
            avatar_url: dto.avatar_url,
        }
    }
}

/// Public profile with follower, following and video counts.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub follower_count: u64,
    pub following_count: u64,
    pub video_count: u64,
    pub is_following: bool,
}

impl Profile {
    pub fn into_dto(self) -> ProfileDto {
        ProfileDto {
            id: self.user.id,
            username: self.user.username,
            role: self.user.role.to_string(),
            display_name: self.user.display_name,
            bio: self.user.bio,
            avatar_url: self.user.avatar_url,
            follower_count: self.follower_count,
            following_count: self.following_count,
            video_count: self.video_count,
            is_following: self.is_following,
        }
    }
}
