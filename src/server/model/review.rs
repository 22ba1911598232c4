use chrono::{DateTime, Utc};

use crate::model::review::{ReviewDto, UpsertReviewDto};

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub order_id: i32,
    pub rating: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn from_entity(entity: entity::review::Model) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            product_id: entity.product_id,
            order_id: entity.order_id,
            rating: entity.rating,
            content: entity.content,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    pub fn into_dto(self) -> ReviewDto {
        ReviewDto {
            id: self.id,
            user_id: self.user_id,
            product_id: self.product_id,
            order_id: self.order_id,
            rating: self.rating,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpsertReviewParams {
    pub user_id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub rating: i32,
    pub content: String,
}

impl UpsertReviewParams {
    pub fn from_dto(user_id: i32, dto: UpsertReviewDto) -> Self {
        Self {
            user_id,
            order_id: dto.order_id,
            product_id: dto.product_id,
            rating: dto.rating,
            content: dto.content,
        }
    }
}
