//! Video factory.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test videos.
pub struct VideoFactory<'a> {
    db: &'a DatabaseConnection,
    owner_id: i32,
    title: String,
    visibility: String,
    view_count: i64,
}

impl<'a> VideoFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, owner_id: i32) -> Self {
        Self {
            db,
            owner_id,
            title: format!("Video {}", next_id()),
            visibility: "PUBLIC".to_string(),
            view_count: 0,
        }
    }

    /// Sets the visibility (`PUBLIC` or `PRIVATE`).
    pub fn visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = visibility.into();
        self
    }

    pub fn view_count(mut self, view_count: i64) -> Self {
        self.view_count = view_count;
        self
    }

    pub async fn build(self) -> Result<entity::video::Model, DbErr> {
        let now = Utc::now();
        entity::video::ActiveModel {
            owner_id: ActiveValue::Set(self.owner_id),
            title: ActiveValue::Set(self.title),
            description: ActiveValue::Set(None),
            video_url: ActiveValue::Set("/media/files/video.mp4".to_string()),
            thumbnail_url: ActiveValue::Set(None),
            visibility: ActiveValue::Set(self.visibility),
            view_count: ActiveValue::Set(self.view_count),
            like_count: ActiveValue::Set(0),
            comment_count: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a public video for the owner.
pub async fn create_video(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<entity::video::Model, DbErr> {
    VideoFactory::new(db, owner_id).build().await
}
