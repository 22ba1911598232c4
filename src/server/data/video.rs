//! Video data repository.
//!
//! `like_count`, `comment_count` and `view_count` are denormalized counters kept
//! on the video row and adjusted with relative `UPDATE`s alongside the rows they
//! count.

use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, ExprTrait},
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use std::collections::HashMap;

use crate::server::model::video::{CreateVideoParams, UpdateVideoParams, Video, Visibility};

pub struct VideoRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VideoRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, params: CreateVideoParams) -> Result<Video, DbErr> {
        let now = Utc::now();
        let entity = entity::video::ActiveModel {
            owner_id: ActiveValue::Set(params.owner_id),
            title: ActiveValue::Set(params.title),
            description: ActiveValue::Set(params.description),
            video_url: ActiveValue::Set(params.video_url),
            thumbnail_url: ActiveValue::Set(params.thumbnail_url),
            visibility: ActiveValue::Set(params.visibility.as_str().to_string()),
            view_count: ActiveValue::Set(0),
            like_count: ActiveValue::Set(0),
            comment_count: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        self.replace_products(entity.id, &params.product_ids).await?;

        Video::from_entity(entity, params.product_ids)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Video>, DbErr> {
        let Some(entity) = entity::prelude::Video::find_by_id(id).one(self.db).await? else {
            return Ok(None);
        };

        let mut products = self.product_ids(vec![id]).await?;
        Ok(Some(Video::from_entity(
            entity,
            products.remove(&id).unwrap_or_default(),
        )?))
    }

    /// Updates a video owned by `params.owner_id`.
    ///
    /// # Returns
    /// - `Ok(None)` - Video not found or owned by someone else
    pub async fn update(&self, params: UpdateVideoParams) -> Result<Option<Video>, DbErr> {
        let Some(entity) = entity::prelude::Video::find_by_id(params.id)
            .filter(entity::video::Column::OwnerId.eq(params.owner_id))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: entity::video::ActiveModel = entity.into();
        if let Some(title) = params.title {
            active.title = ActiveValue::Set(title);
        }
        if let Some(description) = params.description {
            active.description = ActiveValue::Set(Some(description));
        }
        if let Some(thumbnail_url) = params.thumbnail_url {
            active.thumbnail_url = ActiveValue::Set(Some(thumbnail_url));
        }
        if let Some(visibility) = params.visibility {
            active.visibility = ActiveValue::Set(visibility.as_str().to_string());
        }
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(self.db).await?;

        if let Some(product_ids) = params.product_ids {
            self.replace_products(params.id, &product_ids).await?;
        }

        self.find_by_id(params.id).await
    }

    pub async fn delete(&self, id: i32, owner_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Video::delete_many()
            .filter(entity::video::Column::Id.eq(id))
            .filter(entity::video::Column::OwnerId.eq(owner_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn replace_products(&self, video_id: i32, product_ids: &[i32]) -> Result<(), DbErr> {
        entity::prelude::VideoProduct::delete_many()
            .filter(entity::video_product::Column::VideoId.eq(video_id))
            .exec(self.db)
            .await?;

        for product_id in product_ids {
            entity::video_product::ActiveModel {
                video_id: ActiveValue::Set(video_id),
                product_id: ActiveValue::Set(*product_id),
                ..Default::default()
            }
            .insert(self.db)
            .await?;
        }

        Ok(())
    }

    /// Linked product IDs per video.
    async fn product_ids(&self, video_ids: Vec<i32>) -> Result<HashMap<i32, Vec<i32>>, DbErr> {
        if video_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i32)> = entity::prelude::VideoProduct::find()
            .select_only()
            .column(entity::video_product::Column::VideoId)
            .column(entity::video_product::Column::ProductId)
            .filter(entity::video_product::Column::VideoId.is_in(video_ids))
            .order_by_asc(entity::video_product::Column::Id)
            .into_tuple()
            .all(self.db)
            .await?;

        let mut map: HashMap<i32, Vec<i32>> = HashMap::new();
        for (video_id, product_id) in rows {
            map.entry(video_id).or_default().push(product_id);
        }
        Ok(map)
    }

    pub async fn increment_views(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Video::update_many()
            .col_expr(
                entity::video::Column::ViewCount,
                Expr::col(entity::video::Column::ViewCount).add(1),
            )
            .filter(entity::video::Column::Id.eq(id))
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Adds `delta` to the comment counter, never going below zero.
    pub async fn adjust_comment_count(&self, id: i32, delta: i32) -> Result<(), DbErr> {
        let mut update = entity::prelude::Video::update_many()
            .col_expr(
                entity::video::Column::CommentCount,
                Expr::col(entity::video::Column::CommentCount).add(delta),
            )
            .filter(entity::video::Column::Id.eq(id));
        if delta < 0 {
            update = update.filter(entity::video::Column::CommentCount.gte(-delta));
        }
        update.exec(self.db).await?;
        Ok(())
    }

    /// Adds a like; returns `false` if the user already liked the video.
    pub async fn like(&self, video_id: i32, user_id: i32) -> Result<bool, DbErr> {
        let exists = entity::prelude::VideoLike::find()
            .filter(entity::video_like::Column::VideoId.eq(video_id))
            .filter(entity::video_like::Column::UserId.eq(user_id))
            .count(self.db)
            .await?
            > 0;
        if exists {
            return Ok(false);
        }

        entity::video_like::ActiveModel {
            video_id: ActiveValue::Set(video_id),
            user_id: ActiveValue::Set(user_id),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        entity::prelude::Video::update_many()
            .col_expr(
                entity::video::Column::LikeCount,
                Expr::col(entity::video::Column::LikeCount).add(1),
            )
            .filter(entity::video::Column::Id.eq(video_id))
            .exec(self.db)
            .await?;

        Ok(true)
    }

    /// Removes a like; returns `false` if there was none.
    pub async fn unlike(&self, video_id: i32, user_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::VideoLike::delete_many()
            .filter(entity::video_like::Column::VideoId.eq(video_id))
            .filter(entity::video_like::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Ok(false);
        }

        entity::prelude::Video::update_many()
            .col_expr(
                entity::video::Column::LikeCount,
                Expr::col(entity::video::Column::LikeCount).sub(1),
            )
            .filter(entity::video::Column::Id.eq(video_id))
            .filter(entity::video::Column::LikeCount.gt(0))
            .exec(self.db)
            .await?;

        Ok(true)
    }

    pub async fn has_liked(&self, video_id: i32, user_id: i32) -> Result<bool, DbErr> {
        let count = entity::prelude::VideoLike::find()
            .filter(entity::video_like::Column::VideoId.eq(video_id))
            .filter(entity::video_like::Column::UserId.eq(user_id))
            .count(self.db)
            .await?;
        Ok(count > 0)
    }

    /// Public videos, newest first.
    pub async fn list_public(&self, page: u64, per_page: u64) -> Result<(Vec<Video>, u64), DbErr> {
        let query = entity::prelude::Video::find()
            .filter(entity::video::Column::Visibility.eq(Visibility::Public.as_str()));
        self.paginate(query, page, per_page).await
    }

    /// Public videos from any of `owner_ids`, newest first.
    pub async fn list_public_by_owners(
        &self,
        owner_ids: Vec<i32>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Video>, u64), DbErr> {
        if owner_ids.is_empty() {
            return Ok((Vec::new(), 0));
        }
        let query = entity::prelude::Video::find()
            .filter(entity::video::Column::Visibility.eq(Visibility::Public.as_str()))
            .filter(entity::video::Column::OwnerId.is_in(owner_ids));
        self.paginate(query, page, per_page).await
    }

    /// A user's videos; private ones only when `include_private`.
    pub async fn list_by_owner(
        &self,
        owner_id: i32,
        include_private: bool,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Video>, u64), DbErr> {
        let mut query =
            entity::prelude::Video::find().filter(entity::video::Column::OwnerId.eq(owner_id));
        if !include_private {
            query =
                query.filter(entity::video::Column::Visibility.eq(Visibility::Public.as_str()));
        }
        self.paginate(query, page, per_page).await
    }

    async fn paginate(
        &self,
        query: Select<entity::video::Entity>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Video>, u64), DbErr> {
        let paginator = query
            .order_by_desc(entity::video::Column::CreatedAt)
            .order_by_desc(entity::video::Column::Id)
            .paginate(self.db, per_page);
        let total = paginator.num_items().await?;
        let entities = paginator.fetch_page(page).await?;

        let mut products = self
            .product_ids(entities.iter().map(|v| v.id).collect())
            .await?;
        let videos = entities
            .into_iter()
            .map(|v| {
                let ids = products.remove(&v.id).unwrap_or_default();
                Video::from_entity(v, ids)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((videos, total))
    }

    pub async fn count_by_owner(&self, owner_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Video::find()
            .filter(entity::video::Column::OwnerId.eq(owner_id))
            .count(self.db)
            .await
    }

    /// Sum of current view counts across the owner's videos.
    pub async fn total_views(&self, owner_id: i32) -> Result<i64, DbErr> {
        let views: Vec<i64> = entity::prelude::Video::find()
            .select_only()
            .column(entity::video::Column::ViewCount)
            .filter(entity::video::Column::OwnerId.eq(owner_id))
            .into_tuple()
            .all(self.db)
            .await?;

        Ok(views.into_iter().sum())
    }
}
