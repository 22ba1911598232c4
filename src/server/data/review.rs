use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::review::{Review, UpsertReviewParams};

pub struct ReviewRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReviewRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates the review for (user, product, order) or updates the existing one.
    pub async fn upsert(&self, params: UpsertReviewParams) -> Result<Review, DbErr> {
        let now = Utc::now();
        let existing = entity::prelude::Review::find()
            .filter(entity::review::Column::UserId.eq(params.user_id))
            .filter(entity::review::Column::ProductId.eq(params.product_id))
            .filter(entity::review::Column::OrderId.eq(params.order_id))
            .one(self.db)
            .await?;

        let entity = match existing {
            Some(entity) => {
                let mut active: entity::review::ActiveModel = entity.into();
                active.rating = ActiveValue::Set(params.rating);
                active.content = ActiveValue::Set(params.content);
                active.updated_at = ActiveValue::Set(now);
                active.update(self.db).await?
            }
            None => {
                entity::review::ActiveModel {
                    user_id: ActiveValue::Set(params.user_id),
                    product_id: ActiveValue::Set(params.product_id),
                    order_id: ActiveValue::Set(params.order_id),
                    rating: ActiveValue::Set(params.rating),
                    content: ActiveValue::Set(params.content),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        Ok(Review::from_entity(entity))
    }

    /// Gets a page of a product's reviews, newest first.
    ///
    /// # Returns
    /// - `Ok((Vec<Review>, u64))` - The page and the total number of reviews
    pub async fn list_by_product(
        &self,
        product_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Review>, u64), DbErr> {
        let paginator = entity::prelude::Review::find()
            .filter(entity::review::Column::ProductId.eq(product_id))
            .order_by_desc(entity::review::Column::CreatedAt)
            .order_by_desc(entity::review::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let entities = paginator.fetch_page(page).await?;

        Ok((entities.into_iter().map(Review::from_entity).collect(), total))
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Review::delete_many()
            .filter(entity::review::Column::Id.eq(id))
            .filter(entity::review::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
