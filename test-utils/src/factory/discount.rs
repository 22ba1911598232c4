//! Discount factory.

use crate::factory::helpers::next_id;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test discounts.
///
/// Defaults to an active 10% discount valid from one day ago to seven days
/// from now, without a usage cap and one use per customer.
pub struct DiscountFactory<'a> {
    db: &'a DatabaseConnection,
    shop_id: i32,
    code: String,
    kind: String,
    value: i64,
    max_discount_amount: Option<i64>,
    min_order_total: i64,
    max_uses: Option<i32>,
    used_count: i32,
    max_uses_per_user: i32,
    active: bool,
    product_ids: Vec<i32>,
}

impl<'a> DiscountFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, shop_id: i32) -> Self {
        Self {
            db,
            shop_id,
            code: format!("CODE{}", next_id()),
            kind: "PERCENTAGE".to_string(),
            value: 10,
            max_discount_amount: None,
            min_order_total: 0,
            max_uses: None,
            used_count: 0,
            max_uses_per_user: 1,
            active: true,
            product_ids: Vec::new(),
        }
    }

    /// Makes this a fixed-amount discount.
    pub fn fixed(mut self, value: i64) -> Self {
        self.kind = "FIXED".to_string();
        self.value = value;
        self
    }

    /// Makes this a percentage discount.
    pub fn percentage(mut self, value: i64) -> Self {
        self.kind = "PERCENTAGE".to_string();
        self.value = value;
        self
    }

    pub fn max_discount_amount(mut self, amount: i64) -> Self {
        self.max_discount_amount = Some(amount);
        self
    }

    pub fn min_order_total(mut self, total: i64) -> Self {
        self.min_order_total = total;
        self
    }

    pub fn max_uses(mut self, max_uses: i32, used_count: i32) -> Self {
        self.max_uses = Some(max_uses);
        self.used_count = used_count;
        self
    }

    pub fn max_uses_per_user(mut self, max: i32) -> Self {
        self.max_uses_per_user = max;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Restricts the discount to the given product.
    pub fn product(mut self, product_id: i32) -> Self {
        self.product_ids.push(product_id);
        self
    }

    pub async fn build(self) -> Result<entity::discount::Model, DbErr> {
        let now = Utc::now();
        let discount = entity::discount::ActiveModel {
            shop_id: ActiveValue::Set(self.shop_id),
            code: ActiveValue::Set(self.code),
            description: ActiveValue::Set(None),
            kind: ActiveValue::Set(self.kind),
            value: ActiveValue::Set(self.value),
            max_discount_amount: ActiveValue::Set(self.max_discount_amount),
            min_order_total: ActiveValue::Set(self.min_order_total),
            max_uses: ActiveValue::Set(self.max_uses),
            used_count: ActiveValue::Set(self.used_count),
            max_uses_per_user: ActiveValue::Set(self.max_uses_per_user),
            starts_at: ActiveValue::Set(now - Duration::days(1)),
            ends_at: ActiveValue::Set(now + Duration::days(7)),
            active: ActiveValue::Set(self.active),
            created_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        for product_id in self.product_ids {
            entity::discount_product::ActiveModel {
                discount_id: ActiveValue::Set(discount.id),
                product_id: ActiveValue::Set(product_id),
                ..Default::default()
            }
            .insert(self.db)
            .await?;
        }

        Ok(discount)
    }
}

/// Creates an active 10% discount for the shop.
pub async fn create_discount(
    db: &DatabaseConnection,
    shop_id: i32,
) -> Result<entity::discount::Model, DbErr> {
    DiscountFactory::new(db, shop_id).build().await
}
