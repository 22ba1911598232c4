//! Video feed, likes and comments.
//!
//! `like_count` and `comment_count` are denormalized on the video row and are
//! only changed together with the like or comment rows they count.

use sea_orm::DatabaseConnection;
use std::path::Path;

use crate::server::{
    data::{
        comment::CommentRepository, follow::FollowRepository, product::ProductRepository,
        video::VideoRepository,
    },
    error::{auth::AuthError, AppError},
    model::video::{Comment, CreateVideoParams, UpdateVideoParams, Video, Visibility},
    service::storage::StorageService,
    util::pagination::{Page, PaginationParams},
};

pub const MAX_COMMENT_LENGTH: usize = 500;

pub struct VideoService<'a> {
    db: &'a DatabaseConnection,
    storage: StorageService<'a>,
}

impl<'a> VideoService<'a> {
    pub fn new(db: &'a DatabaseConnection, upload_dir: &'a Path) -> Self {
        Self {
            db,
            storage: StorageService::new(upload_dir),
        }
    }

    pub async fn create(&self, mut params: CreateVideoParams) -> Result<Video, AppError> {
        params.title = params.title.trim().to_string();
        if params.title.is_empty() {
            return Err(AppError::BadRequest("Title cannot be empty".to_string()));
        }
        if params.video_url.trim().is_empty() {
            return Err(AppError::BadRequest("Video URL is required".to_string()));
        }

        params.product_ids = self.check_products(params.owner_id, params.product_ids).await?;
        params.video_url = self.storage.commit(&params.video_url).await?;
        params.thumbnail_url = self.storage.commit_optional(params.thumbnail_url).await?;

        let video = VideoRepository::new(self.db).create(params).await?;
        tracing::info!("User {} published video {}", video.owner_id, video.id);

        Ok(video)
    }

    pub async fn update(&self, mut params: UpdateVideoParams) -> Result<Video, AppError> {
        params.title = params.title.map(|t| t.trim().to_string());
        if params.title.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::BadRequest("Title cannot be empty".to_string()));
        }

        if let Some(product_ids) = params.product_ids.take() {
            params.product_ids = Some(self.check_products(params.owner_id, product_ids).await?);
        }
        params.thumbnail_url = self.storage.commit_optional(params.thumbnail_url).await?;

        VideoRepository::new(self.db)
            .update(params)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    pub async fn delete(&self, id: i32, owner_id: i32) -> Result<(), AppError> {
        if !VideoRepository::new(self.db).delete(id, owner_id).await? {
            return Err(AppError::NotFound("Video not found".to_string()));
        }
        Ok(())
    }

    /// Loads a video and counts the view.
    ///
    /// Private videos are reported as missing to everyone but their owner.
    pub async fn get(&self, id: i32, viewer_id: Option<i32>) -> Result<Video, AppError> {
        let repo = VideoRepository::new(self.db);
        let mut video = self.find_visible(id, viewer_id).await?;

        repo.increment_views(video.id).await?;
        video.view_count += 1;

        Ok(video)
    }

    /// Public videos, newest first.
    pub async fn feed(&self, pagination: PaginationParams) -> Result<Page<Video>, AppError> {
        let pagination = pagination.clamped();
        let (videos, total) = VideoRepository::new(self.db)
            .list_public(pagination.page, pagination.per_page)
            .await?;

        Ok(Page::new(videos, total, pagination))
    }

    /// Public videos of the users `user_id` follows, newest first.
    pub async fn following_feed(
        &self,
        user_id: i32,
        pagination: PaginationParams,
    ) -> Result<Page<Video>, AppError> {
        let pagination = pagination.clamped();
        let following = FollowRepository::new(self.db).following_ids(user_id).await?;

        let (videos, total) = VideoRepository::new(self.db)
            .list_public_by_owners(following, pagination.page, pagination.per_page)
            .await?;

        Ok(Page::new(videos, total, pagination))
    }

    /// A user's videos; private ones are included only for the owner.
    pub async fn list_by_user(
        &self,
        owner_id: i32,
        viewer_id: Option<i32>,
        pagination: PaginationParams,
    ) -> Result<Page<Video>, AppError> {
        let pagination = pagination.clamped();
        let include_private = viewer_id == Some(owner_id);

        let (videos, total) = VideoRepository::new(self.db)
            .list_by_owner(owner_id, include_private, pagination.page, pagination.per_page)
            .await?;

        Ok(Page::new(videos, total, pagination))
    }

    pub async fn like(&self, video_id: i32, user_id: i32) -> Result<Video, AppError> {
        let repo = VideoRepository::new(self.db);
        self.find_visible(video_id, Some(user_id)).await?;

        repo.like(video_id, user_id).await?;
        self.find_visible(video_id, Some(user_id)).await
    }

    pub async fn unlike(&self, video_id: i32, user_id: i32) -> Result<Video, AppError> {
        let repo = VideoRepository::new(self.db);
        self.find_visible(video_id, Some(user_id)).await?;

        repo.unlike(video_id, user_id).await?;
        self.find_visible(video_id, Some(user_id)).await
    }

    /// Adds a comment or a reply.
    ///
    /// # Returns
    /// - `Err(AppError::BadRequest)` - Empty or overlong content, or a parent on another video
    pub async fn create_comment(
        &self,
        video_id: i32,
        user_id: i32,
        parent_id: Option<i32>,
        content: String,
    ) -> Result<Comment, AppError> {
        let content = content.trim().to_string();
        if content.is_empty() || content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Comment must be between 1 and {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        self.find_visible(video_id, Some(user_id)).await?;

        let comments = CommentRepository::new(self.db);
        if let Some(parent_id) = parent_id {
            let parent = comments.find_by_id(parent_id).await?;
            if parent.is_none_or(|p| p.video_id != video_id) {
                return Err(AppError::BadRequest(
                    "Parent comment does not belong to this video".to_string(),
                ));
            }
        }

        let comment = comments.create(video_id, user_id, parent_id, content).await?;
        VideoRepository::new(self.db)
            .adjust_comment_count(video_id, 1)
            .await?;

        Ok(comment)
    }

    /// Comments on a video, oldest first.
    pub async fn list_comments(
        &self,
        video_id: i32,
        viewer_id: Option<i32>,
        pagination: PaginationParams,
    ) -> Result<Page<Comment>, AppError> {
        let pagination = pagination.clamped();
        self.find_visible(video_id, viewer_id).await?;

        let (comments, total) = CommentRepository::new(self.db)
            .list_by_video(video_id, pagination.page, pagination.per_page)
            .await?;

        Ok(Page::new(comments, total, pagination))
    }

    /// Deletes a comment with its replies.
    ///
    /// Allowed for the comment's author and the video's owner.
    pub async fn delete_comment(&self, comment_id: i32, user_id: i32) -> Result<(), AppError> {
        let comments = CommentRepository::new(self.db);
        let videos = VideoRepository::new(self.db);

        let comment = comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        if comment.user_id != user_id {
            let video = videos
                .find_by_id(comment.video_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

            if video.owner_id != user_id {
                return Err(AuthError::AccessDenied(
                    user_id,
                    format!("cannot delete comment {}", comment_id),
                )
                .into());
            }
        }

        let removed = comments.delete_thread(comment.id).await?;
        videos
            .adjust_comment_count(comment.video_id, -(removed as i32))
            .await?;

        Ok(())
    }

    async fn find_visible(&self, id: i32, viewer_id: Option<i32>) -> Result<Video, AppError> {
        VideoRepository::new(self.db)
            .find_by_id(id)
            .await?
            .filter(|v| v.visibility == Visibility::Public || Some(v.owner_id) == viewer_id)
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    /// Deduplicates the IDs and checks they are all the creator's products.
    async fn check_products(&self, owner_id: i32, mut product_ids: Vec<i32>) -> Result<Vec<i32>, AppError> {
        product_ids.sort_unstable();
        product_ids.dedup();

        let owned = ProductRepository::new(self.db)
            .owned_ids(owner_id, product_ids.clone())
            .await?;

        if owned.len() != product_ids.len() {
            return Err(AppError::BadRequest(
                "Videos can only link your own products".to_string(),
            ));
        }

        Ok(product_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    /// Tests that viewing a video counts the view.
    ///
    /// Expected: view_count incremented on each get
    #[tokio::test]
    async fn counts_views() {
        let test = TestBuilder::new().with_video_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let owner = factory::create_user(db).await.unwrap();
        let video = factory::create_video(db, owner.id).await.unwrap();
        let service = VideoService::new(db, dir.path());

        service.get(video.id, None).await.unwrap();
        let seen = service.get(video.id, None).await.unwrap();

        assert_eq!(seen.view_count, video.view_count + 2);
    }

    /// Tests private video visibility.
    ///
    /// Expected: NotFound for other viewers, visible to the owner
    #[tokio::test]
    async fn hides_private_videos() {
        let test = TestBuilder::new().with_video_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let owner = factory::create_user(db).await.unwrap();
        let viewer = factory::create_user(db).await.unwrap();
        let video = factory::video::VideoFactory::new(db, owner.id)
            .visibility("PRIVATE")
            .build()
            .await
            .unwrap();
        let service = VideoService::new(db, dir.path());

        assert!(matches!(
            service.get(video.id, Some(viewer.id)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(service.get(video.id, Some(owner.id)).await.is_ok());
    }

    /// Tests idempotent likes.
    ///
    /// Expected: like_count stays 1 after liking twice and returns to 0 after unlike
    #[tokio::test]
    async fn keeps_like_count_in_step() {
        let test = TestBuilder::new().with_video_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let owner = factory::create_user(db).await.unwrap();
        let fan = factory::create_user(db).await.unwrap();
        let video = factory::create_video(db, owner.id).await.unwrap();
        let service = VideoService::new(db, dir.path());

        service.like(video.id, fan.id).await.unwrap();
        let liked = service.like(video.id, fan.id).await.unwrap();
        assert_eq!(liked.like_count, 1);

        let unliked = service.unlike(video.id, fan.id).await.unwrap();
        assert_eq!(unliked.like_count, 0);
    }

    /// Tests that deleting a comment removes its replies from the count.
    ///
    /// Expected: comment_count drops by the size of the thread
    #[tokio::test]
    async fn deletes_comment_threads() {
        let test = TestBuilder::new().with_video_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let owner = factory::create_user(db).await.unwrap();
        let commenter = factory::create_user(db).await.unwrap();
        let video = factory::create_video(db, owner.id).await.unwrap();
        let service = VideoService::new(db, dir.path());

        let root = service
            .create_comment(video.id, commenter.id, None, "Looks great".to_string())
            .await
            .unwrap();
        service
            .create_comment(video.id, owner.id, Some(root.id), "Thanks!".to_string())
            .await
            .unwrap();
        service
            .create_comment(video.id, owner.id, None, "Recipe below".to_string())
            .await
            .unwrap();

        // The video owner may remove someone else's thread
        service.delete_comment(root.id, owner.id).await.unwrap();

        let video = service.get(video.id, None).await.unwrap();
        assert_eq!(video.comment_count, 1);
    }

    /// Tests comment validation.
    ///
    /// Expected: BadRequest for empty content and a parent from another video,
    /// access denied for unrelated users deleting
    #[tokio::test]
    async fn validates_comments() {
        let test = TestBuilder::new().with_video_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let owner = factory::create_user(db).await.unwrap();
        let stranger = factory::create_user(db).await.unwrap();
        let first = factory::create_video(db, owner.id).await.unwrap();
        let second = factory::create_video(db, owner.id).await.unwrap();
        let service = VideoService::new(db, dir.path());

        assert!(matches!(
            service
                .create_comment(first.id, owner.id, None, "   ".to_string())
                .await,
            Err(AppError::BadRequest(_))
        ));

        let comment = service
            .create_comment(first.id, owner.id, None, "Hello".to_string())
            .await
            .unwrap();
        assert!(matches!(
            service
                .create_comment(second.id, owner.id, Some(comment.id), "Reply".to_string())
                .await,
            Err(AppError::BadRequest(_))
        ));

        assert!(matches!(
            service.delete_comment(comment.id, stranger.id).await,
            Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
        ));
    }

    /// Tests linking products when publishing.
    ///
    /// Expected: BadRequest when linking another user's product
    #[tokio::test]
    async fn only_links_own_products() {
        let test = TestBuilder::new().with_video_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let other = factory::create_shop(db).await.unwrap();
        let own = factory::create_product(db, shop.id).await.unwrap();
        let foreign = factory::create_product(db, other.id).await.unwrap();
        let service = VideoService::new(db, dir.path());

        let params = |product_ids: Vec<i32>| CreateVideoParams {
            owner_id: shop.id,
            title: "Cooking".to_string(),
            description: None,
            video_url: "https://cdn.example.com/v.mp4".to_string(),
            thumbnail_url: None,
            visibility: Visibility::Public,
            product_ids,
        };

        assert!(matches!(
            service.create(params(vec![own.id, foreign.id])).await,
            Err(AppError::BadRequest(_))
        ));

        let video = service.create(params(vec![own.id, own.id])).await.unwrap();
        assert_eq!(video.product_ids, vec![own.id]);
    }
}
