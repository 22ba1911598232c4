use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::server::model::video::Comment;

pub struct CommentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CommentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        video_id: i32,
        user_id: i32,
        parent_id: Option<i32>,
        content: String,
    ) -> Result<Comment, DbErr> {
        let entity = entity::comment::ActiveModel {
            video_id: ActiveValue::Set(video_id),
            user_id: ActiveValue::Set(user_id),
            parent_id: ActiveValue::Set(parent_id),
            content: ActiveValue::Set(content),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Comment::from_entity(entity))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Comment>, DbErr> {
        let entity = entity::prelude::Comment::find_by_id(id).one(self.db).await?;
        Ok(entity.map(Comment::from_entity))
    }

    /// A video's comments, oldest first.
    pub async fn list_by_video(
        &self,
        video_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Comment>, u64), DbErr> {
        let paginator = entity::prelude::Comment::find()
            .filter(entity::comment::Column::VideoId.eq(video_id))
            .order_by_asc(entity::comment::Column::CreatedAt)
            .order_by_asc(entity::comment::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let comments = paginator
            .fetch_page(page)
            .await?
            .into_iter()
            .map(Comment::from_entity)
            .collect();

        Ok((comments, total))
    }

    /// Deletes a comment and every reply beneath it.
    ///
    /// # Returns
    /// - `Ok(count)` - Number of comments removed
    pub async fn delete_thread(&self, id: i32) -> Result<u64, DbErr> {
        let mut ids = vec![id];
        let mut frontier = vec![id];

        while !frontier.is_empty() {
            let children: Vec<i32> = entity::prelude::Comment::find()
                .select_only()
                .column(entity::comment::Column::Id)
                .filter(entity::comment::Column::ParentId.is_in(frontier))
                .into_tuple()
                .all(self.db)
                .await?;
            ids.extend(children.iter().copied());
            frontier = children;
        }

        let result = entity::prelude::Comment::delete_many()
            .filter(entity::comment::Column::Id.is_in(ids))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
