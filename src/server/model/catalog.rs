//! Category and product domain models.

use chrono::{DateTime, Utc};

use crate::model::catalog::{
    CategoryDto, CreateProductDto, ProductDto, RatingSummaryDto, UpdateProductDto,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

impl Category {
    pub fn from_entity(entity: entity::category::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }

    pub fn into_dto(self) -> CategoryDto {
        CategoryDto {
            id: self.id,
            name: self.name,
        }
    }
}

/// Aggregate of a product's reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingSummary {
    /// Mean rating rounded to two decimals.
    pub average: f64,
    pub count: u64,
}

impl RatingSummary {
    /// Builds a summary from the rating sum and count.
    pub fn from_totals(sum: i64, count: u64) -> Self {
        if count == 0 {
            return Self::default();
        }
        let average = sum as f64 / count as f64;
        Self {
            average: (average * 100.0).round() / 100.0,
            count,
        }
    }

    pub fn into_dto(self) -> RatingSummaryDto {
        RatingSummaryDto {
            average: self.average,
            count: self.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub shop_id: i32,
    pub category_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub rating: RatingSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn from_entity(entity: entity::product::Model, rating: RatingSummary) -> Self {
        Self {
            id: entity.id,
            shop_id: entity.shop_id,
            category_id: entity.category_id,
            name: entity.name,
            description: entity.description,
            price: entity.price,
            quantity: entity.quantity,
            image_url: entity.image_url,
            rating,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    pub fn into_dto(self) -> ProductDto {
        ProductDto {
            id: self.id,
            shop_id: self.shop_id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            price: self.price,
            quantity: self.quantity,
            image_url: self.image_url,
            rating: self.rating.into_dto(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateProductParams {
    pub shop_id: i32,
    pub category_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub quantity: i32,
    pub image_url: Option<String>,
}

impl CreateProductParams {
    pub fn from_dto(shop_id: i32, dto: CreateProductDto) -> Self {
        Self {
            shop_id,
            category_id: dto.category_id,
            name: dto.name,
            description: dto.description,
            price: dto.price,
            quantity: dto.quantity,
            image_url: dto.image_url,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductParams {
    pub id: i32,
    pub shop_id: i32,
    pub category_id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i32>,
    pub image_url: Option<String>,
}

impl UpdateProductParams {
    pub fn from_dto(id: i32, shop_id: i32, dto: UpdateProductDto) -> Self {
        Self {
            id,
            shop_id,
            category_id: dto.category_id,
            name: dto.name,
            description: dto.description,
            price: dto.price,
            quantity: dto.quantity,
            image_url: dto.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_average_to_two_decimals() {
        let summary = RatingSummary::from_totals(13, 3);
        assert_eq!(summary.average, 4.33);
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(RatingSummary::from_totals(0, 0), RatingSummary::default());
    }
}
