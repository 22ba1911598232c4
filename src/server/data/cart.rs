//! Cart data repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::cart::CartLine;

pub struct CartRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CartRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the user's line for a product, if present.
    pub async fn find_line(
        &self,
        user_id: i32,
        product_id: i32,
    ) -> Result<Option<entity::cart_item::Model>, DbErr> {
        entity::prelude::CartItem::find()
            .filter(entity::cart_item::Column::UserId.eq(user_id))
            .filter(entity::cart_item::Column::ProductId.eq(product_id))
            .one(self.db)
            .await
    }

    /// Finds a cart line owned by the user.
    pub async fn find_owned(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<entity::cart_item::Model>, DbErr> {
        entity::prelude::CartItem::find_by_id(id)
            .filter(entity::cart_item::Column::UserId.eq(user_id))
            .one(self.db)
            .await
    }

    pub async fn insert(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<(), DbErr> {
        entity::cart_item::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            product_id: ActiveValue::Set(product_id),
            quantity: ActiveValue::Set(quantity),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(())
    }

    pub async fn set_quantity(&self, id: i32, quantity: i32) -> Result<(), DbErr> {
        entity::cart_item::ActiveModel {
            id: ActiveValue::Unchanged(id),
            quantity: ActiveValue::Set(quantity),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::CartItem::delete_many()
            .filter(entity::cart_item::Column::Id.eq(id))
            .filter(entity::cart_item::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes the given lines belonging to the user.
    pub async fn delete_many(&self, user_id: i32, ids: Vec<i32>) -> Result<u64, DbErr> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = entity::prelude::CartItem::delete_many()
            .filter(entity::cart_item::Column::UserId.eq(user_id))
            .filter(entity::cart_item::Column::Id.is_in(ids))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// The user's cart lines joined with their products, oldest first.
    ///
    /// When `ids` is given only those lines are returned.
    pub async fn list_lines(
        &self,
        user_id: i32,
        ids: Option<Vec<i32>>,
    ) -> Result<Vec<CartLine>, DbErr> {
        let mut query = entity::prelude::CartItem::find()
            .filter(entity::cart_item::Column::UserId.eq(user_id));
        if let Some(ids) = ids {
            query = query.filter(entity::cart_item::Column::Id.is_in(ids));
        }

        let rows = query
            .order_by_asc(entity::cart_item::Column::CreatedAt)
            .order_by_asc(entity::cart_item::Column::Id)
            .find_also_related(entity::prelude::Product)
            .all(self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(item, product)| product.map(|p| CartLine::from_entities(item, p)))
            .collect())
    }
}
