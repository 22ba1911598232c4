//! Product factory for creating test catalog entries.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test products with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// let product = ProductFactory::new(&db, shop.id)
///     .name("Pho")
///     .price(45_000)
///     .build()
///     .await?;
/// ```
pub struct ProductFactory<'a> {
    db: &'a DatabaseConnection,
    shop_id: i32,
    category_id: Option<i32>,
    name: String,
    price: i64,
    quantity: i32,
}

impl<'a> ProductFactory<'a> {
    /// Creates a new ProductFactory with default values.
    ///
    /// Defaults:
    /// - name: `"Product {id}"`
    /// - price: `50_000`
    /// - quantity: `100`
    /// - no category
    pub fn new(db: &'a DatabaseConnection, shop_id: i32) -> Self {
        Self {
            db,
            shop_id,
            category_id: None,
            name: format!("Product {}", next_id()),
            price: 50_000,
            quantity: 100,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn price(mut self, price: i64) -> Self {
        self.price = price;
        self
    }

    pub fn quantity(mut self, quantity: i32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn category_id(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub async fn build(self) -> Result<entity::product::Model, DbErr> {
        let now = Utc::now();
        entity::product::ActiveModel {
            shop_id: ActiveValue::Set(self.shop_id),
            category_id: ActiveValue::Set(self.category_id),
            name: ActiveValue::Set(self.name),
            description: ActiveValue::Set(None),
            price: ActiveValue::Set(self.price),
            quantity: ActiveValue::Set(self.quantity),
            image_url: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a product with default values for the shop.
pub async fn create_product(
    db: &DatabaseConnection,
    shop_id: i32,
) -> Result<entity::product::Model, DbErr> {
    ProductFactory::new(db, shop_id).build().await
}
