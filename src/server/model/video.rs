//! Video and comment domain models.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use std::str::FromStr;

use crate::{
    model::video::{CommentDto, CreateVideoDto, UpdateVideoDto, VideoDto},
    server::model::invalid_column,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Private => "PRIVATE",
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUBLIC" => Ok(Self::Public),
            "PRIVATE" => Ok(Self::Private),
            other => Err(format!("Unknown visibility '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub visibility: Visibility,
    pub view_count: i64,
    pub like_count: i32,
    pub comment_count: i32,
    pub product_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
}

impl Video {
    pub fn from_entity(entity: entity::video::Model, product_ids: Vec<i32>) -> Result<Self, DbErr> {
        let visibility = entity
            .visibility
            .parse()
            .map_err(|_| invalid_column("video.visibility", &entity.visibility))?;

        Ok(Self {
            id: entity.id,
            owner_id: entity.owner_id,
            title: entity.title,
            description: entity.description,
            video_url: entity.video_url,
            thumbnail_url: entity.thumbnail_url,
            visibility,
            view_count: entity.view_count,
            like_count: entity.like_count,
            comment_count: entity.comment_count,
            product_ids,
            created_at: entity.created_at,
        })
    }

    pub fn into_dto(self) -> VideoDto {
        VideoDto {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            video_url: self.video_url,
            thumbnail_url: self.thumbnail_url,
            visibility: self.visibility.as_str().to_string(),
            view_count: self.view_count,
            like_count: self.like_count,
            comment_count: self.comment_count,
            product_ids: self.product_ids,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateVideoParams {
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub visibility: Visibility,
    pub product_ids: Vec<i32>,
}

impl CreateVideoParams {
    /// Converts the DTO, defaulting visibility to public.
    ///
    /// # Returns
    /// - `Err(String)` - Visibility is not `PUBLIC` or `PRIVATE`
    pub fn from_dto(owner_id: i32, dto: CreateVideoDto) -> Result<Self, String> {
        let visibility = match dto.visibility {
            Some(v) => v.parse()?,
            None => Visibility::Public,
        };

        Ok(Self {
            owner_id,
            title: dto.title,
            description: dto.description,
            video_url: dto.video_url,
            thumbnail_url: dto.thumbnail_url,
            visibility,
            product_ids: dto.product_ids,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UpdateVideoParams {
    pub id: i32,
    pub owner_id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub visibility: Option<Visibility>,
    pub product_ids: Option<Vec<i32>>,
}

impl UpdateVideoParams {
    pub fn from_dto(id: i32, owner_id: i32, dto: UpdateVideoDto) -> Result<Self, String> {
        Ok(Self {
            id,
            owner_id,
            title: dto.title,
            description: dto.description,
            thumbnail_url: dto.thumbnail_url,
            visibility: dto.visibility.map(|v| v.parse()).transpose()?,
            product_ids: dto.product_ids,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: i32,
    pub video_id: i32,
    pub user_id: i32,
    pub parent_id: Option<i32>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn from_entity(entity: entity::comment::Model) -> Self {
        Self {
            id: entity.id,
            video_id: entity.video_id,
            user_id: entity.user_id,
            parent_id: entity.parent_id,
            content: entity.content,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> CommentDto {
        CommentDto {
            id: self.id,
            video_id: self.video_id,
            user_id: self.user_id,
            parent_id: self.parent_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}
