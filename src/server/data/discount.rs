//! Discount data repository.
//!
//! Redemption bumps the global `used_count` with a conditional `UPDATE` that
//! refuses to pass `max_uses`, then records per-user usage.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, ExprTrait},
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;

use crate::server::model::discount::{CreateDiscountParams, Discount, UpdateDiscountParams};

pub struct DiscountRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DiscountRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, params: CreateDiscountParams) -> Result<Discount, DbErr> {
        let entity = entity::discount::ActiveModel {
            shop_id: ActiveValue::Set(params.shop_id),
            code: ActiveValue::Set(params.code),
            description: ActiveValue::Set(params.description),
            kind: ActiveValue::Set(params.kind.as_str().to_string()),
            value: ActiveValue::Set(params.value),
            max_discount_amount: ActiveValue::Set(params.max_discount_amount),
            min_order_total: ActiveValue::Set(params.min_order_total),
            max_uses: ActiveValue::Set(params.max_uses),
            used_count: ActiveValue::Set(0),
            max_uses_per_user: ActiveValue::Set(params.max_uses_per_user),
            starts_at: ActiveValue::Set(params.starts_at),
            ends_at: ActiveValue::Set(params.ends_at),
            active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        self.replace_products(entity.id, &params.product_ids).await?;

        Discount::from_entity(entity, params.product_ids)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Discount>, DbErr> {
        let mut found = self.find_by_ids(vec![id]).await?;
        Ok(found.pop())
    }

    /// Discounts with the given IDs; unknown IDs are skipped.
    pub async fn find_by_ids(&self, ids: Vec<i32>) -> Result<Vec<Discount>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let entities = entity::prelude::Discount::find()
            .filter(entity::discount::Column::Id.is_in(ids))
            .order_by_asc(entity::discount::Column::Id)
            .all(self.db)
            .await?;

        self.with_products(entities).await
    }

    pub async fn code_exists(
        &self,
        shop_id: i32,
        code: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, DbErr> {
        let mut query = entity::prelude::Discount::find()
            .filter(entity::discount::Column::ShopId.eq(shop_id))
            .filter(entity::discount::Column::Code.eq(code));
        if let Some(id) = exclude_id {
            query = query.filter(entity::discount::Column::Id.ne(id));
        }

        Ok(query.count(self.db).await? > 0)
    }

    /// Applies changes to a discount owned by the shop.
    pub async fn update(
        &self,
        id: i32,
        shop_id: i32,
        params: UpdateDiscountParams,
    ) -> Result<Option<Discount>, DbErr> {
        let Some(entity) = entity::prelude::Discount::find_by_id(id)
            .filter(entity::discount::Column::ShopId.eq(shop_id))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: entity::discount::ActiveModel = entity.into();
        if let Some(description) = params.description {
            active.description = ActiveValue::Set(Some(description));
        }
        if let Some(value) = params.value {
            active.value = ActiveValue::Set(value);
        }
        if let Some(max) = params.max_discount_amount {
            active.max_discount_amount = ActiveValue::Set(Some(max));
        }
        if let Some(min) = params.min_order_total {
            active.min_order_total = ActiveValue::Set(min);
        }
        if let Some(max_uses) = params.max_uses {
            active.max_uses = ActiveValue::Set(Some(max_uses));
        }
        if let Some(per_user) = params.max_uses_per_user {
            active.max_uses_per_user = ActiveValue::Set(per_user);
        }
        if let Some(starts_at) = params.starts_at {
            active.starts_at = ActiveValue::Set(starts_at);
        }
        if let Some(ends_at) = params.ends_at {
            active.ends_at = ActiveValue::Set(ends_at);
        }
        if let Some(is_active) = params.active {
            active.active = ActiveValue::Set(is_active);
        }
        active.update(self.db).await?;

        if let Some(product_ids) = params.product_ids {
            self.replace_products(id, &product_ids).await?;
        }

        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: i32, shop_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Discount::delete_many()
            .filter(entity::discount::Column::Id.eq(id))
            .filter(entity::discount::Column::ShopId.eq(shop_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// All of a shop's discounts, newest first.
    pub async fn list_by_shop(&self, shop_id: i32) -> Result<Vec<Discount>, DbErr> {
        let entities = entity::prelude::Discount::find()
            .filter(entity::discount::Column::ShopId.eq(shop_id))
            .order_by_desc(entity::discount::Column::CreatedAt)
            .order_by_desc(entity::discount::Column::Id)
            .all(self.db)
            .await?;

        self.with_products(entities).await
    }

    /// A shop's active discounts whose window contains `now`.
    pub async fn list_live_by_shop(
        &self,
        shop_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Discount>, DbErr> {
        let entities = entity::prelude::Discount::find()
            .filter(entity::discount::Column::ShopId.eq(shop_id))
            .filter(entity::discount::Column::Active.eq(true))
            .filter(entity::discount::Column::StartsAt.lte(now))
            .filter(entity::discount::Column::EndsAt.gte(now))
            .order_by_asc(entity::discount::Column::EndsAt)
            .all(self.db)
            .await?;

        self.with_products(entities).await
    }

    async fn replace_products(&self, discount_id: i32, product_ids: &[i32]) -> Result<(), DbErr> {
        entity::prelude::DiscountProduct::delete_many()
            .filter(entity::discount_product::Column::DiscountId.eq(discount_id))
            .exec(self.db)
            .await?;

        for product_id in product_ids {
            entity::discount_product::ActiveModel {
                discount_id: ActiveValue::Set(discount_id),
                product_id: ActiveValue::Set(*product_id),
                ..Default::default()
            }
            .insert(self.db)
            .await?;
        }

        Ok(())
    }

    async fn with_products(
        &self,
        entities: Vec<entity::discount::Model>,
    ) -> Result<Vec<Discount>, DbErr> {
        let ids: Vec<i32> = entities.iter().map(|d| d.id).collect();
        let mut products: HashMap<i32, Vec<i32>> = HashMap::new();
        if !ids.is_empty() {
            let rows: Vec<(i32, i32)> = entity::prelude::DiscountProduct::find()
                .select_only()
                .column(entity::discount_product::Column::DiscountId)
                .column(entity::discount_product::Column::ProductId)
                .filter(entity::discount_product::Column::DiscountId.is_in(ids))
                .into_tuple()
                .all(self.db)
                .await?;
            for (discount_id, product_id) in rows {
                products.entry(discount_id).or_default().push(product_id);
            }
        }

        entities
            .into_iter()
            .map(|d| {
                let ids = products.remove(&d.id).unwrap_or_default();
                Discount::from_entity(d, ids)
            })
            .collect()
    }

    /// How many times the user has redeemed the discount.
    pub async fn user_usage(&self, discount_id: i32, user_id: i32) -> Result<i32, DbErr> {
        let usage = entity::prelude::DiscountUsage::find()
            .filter(entity::discount_usage::Column::DiscountId.eq(discount_id))
            .filter(entity::discount_usage::Column::UserId.eq(user_id))
            .one(self.db)
            .await?;

        Ok(usage.map(|u| u.count).unwrap_or(0))
    }

    /// Redeems one use of the discount for the user.
    ///
    /// # Returns
    /// - `Ok(true)` - Usage recorded
    /// - `Ok(false)` - Global cap already reached, nothing changed
    pub async fn redeem(&self, discount_id: i32, user_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Discount::update_many()
            .col_expr(
                entity::discount::Column::UsedCount,
                Expr::col(entity::discount::Column::UsedCount).add(1),
            )
            .filter(entity::discount::Column::Id.eq(discount_id))
            .filter(
                Condition::any()
                    .add(entity::discount::Column::MaxUses.is_null())
                    .add(
                        Expr::col(entity::discount::Column::UsedCount)
                            .lt(Expr::col(entity::discount::Column::MaxUses)),
                    ),
            )
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(false);
        }

        let existing = entity::prelude::DiscountUsage::find()
            .filter(entity::discount_usage::Column::DiscountId.eq(discount_id))
            .filter(entity::discount_usage::Column::UserId.eq(user_id))
            .one(self.db)
            .await?;

        match existing {
            Some(usage) => {
                entity::prelude::DiscountUsage::update_many()
                    .col_expr(
                        entity::discount_usage::Column::Count,
                        Expr::col(entity::discount_usage::Column::Count).add(1),
                    )
                    .filter(entity::discount_usage::Column::Id.eq(usage.id))
                    .exec(self.db)
                    .await?;
            }
            None => {
                entity::discount_usage::ActiveModel {
                    discount_id: ActiveValue::Set(discount_id),
                    user_id: ActiveValue::Set(user_id),
                    count: ActiveValue::Set(1),
                    ..Default::default()
                }
                .insert(self.db)
                .await?;
            }
        }

        Ok(true)
    }

    /// Gives back one use of the discount for the user.
    pub async fn release(&self, discount_id: i32, user_id: i32) -> Result<(), DbErr> {
        entity::prelude::Discount::update_many()
            .col_expr(
                entity::discount::Column::UsedCount,
                Expr::col(entity::discount::Column::UsedCount).sub(1),
            )
            .filter(entity::discount::Column::Id.eq(discount_id))
            .filter(entity::discount::Column::UsedCount.gt(0))
            .exec(self.db)
            .await?;

        entity::prelude::DiscountUsage::update_many()
            .col_expr(
                entity::discount_usage::Column::Count,
                Expr::col(entity::discount_usage::Column::Count).sub(1),
            )
            .filter(entity::discount_usage::Column::DiscountId.eq(discount_id))
            .filter(entity::discount_usage::Column::UserId.eq(user_id))
            .filter(entity::discount_usage::Column::Count.gt(0))
            .exec(self.db)
            .await?;

        Ok(())
    }
}
