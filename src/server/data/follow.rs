use chrono::Utc;
use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect,
};

pub struct FollowRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> FollowRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records that `follower_id` follows `following_id`; existing follows are kept.
    pub async fn follow(&self, follower_id: i32, following_id: i32) -> Result<(), DbErr> {
        entity::prelude::UserFollow::insert(entity::user_follow::ActiveModel {
            follower_id: ActiveValue::Set(follower_id),
            following_id: ActiveValue::Set(following_id),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([
                entity::user_follow::Column::FollowerId,
                entity::user_follow::Column::FollowingId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .do_nothing()
        .exec(self.db)
        .await?;

        Ok(())
    }

    pub async fn unfollow(&self, follower_id: i32, following_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::UserFollow::delete_many()
            .filter(entity::user_follow::Column::FollowerId.eq(follower_id))
            .filter(entity::user_follow::Column::FollowingId.eq(following_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn is_following(&self, follower_id: i32, following_id: i32) -> Result<bool, DbErr> {
        let count = entity::prelude::UserFollow::find()
            .filter(entity::user_follow::Column::FollowerId.eq(follower_id))
            .filter(entity::user_follow::Column::FollowingId.eq(following_id))
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    pub async fn count_followers(&self, user_id: i32) -> Result<u64, DbErr> {
        entity::prelude::UserFollow::find()
            .filter(entity::user_follow::Column::FollowingId.eq(user_id))
            .count(self.db)
            .await
    }

    pub async fn count_following(&self, user_id: i32) -> Result<u64, DbErr> {
        entity::prelude::UserFollow::find()
            .filter(entity::user_follow::Column::FollowerId.eq(user_id))
            .count(self.db)
            .await
    }

    /// IDs of users that `follower_id` follows.
    pub async fn following_ids(&self, follower_id: i32) -> Result<Vec<i32>, DbErr> {
        entity::prelude::UserFollow::find()
            .select_only()
            .column(entity::user_follow::Column::FollowingId)
            .filter(entity::user_follow::Column::FollowerId.eq(follower_id))
            .into_tuple()
            .all(self.db)
            .await
    }
}
