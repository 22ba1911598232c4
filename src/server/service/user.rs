use sea_orm::DatabaseConnection;

use crate::server::{
    data::{follow::FollowRepository, user::UserRepository, video::VideoRepository},
    error::AppError,
    model::user::{Profile, UpdateUserParams, User},
};

pub struct UserService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn update_me(&self, user_id: i32, params: UpdateUserParams) -> Result<User, AppError> {
        if params
            .display_name
            .as_deref()
            .is_some_and(|n| n.trim().is_empty())
        {
            return Err(AppError::BadRequest(
                "Display name cannot be empty".to_string(),
            ));
        }

        UserRepository::new(self.db)
            .update_profile(user_id, params)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Public profile of a user, with `is_following` relative to the viewer.
    pub async fn get_profile(&self, user_id: i32, viewer_id: Option<i32>) -> Result<Profile, AppError> {
        let user = UserRepository::new(self.db)
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let follow_repo = FollowRepository::new(self.db);
        let is_following = match viewer_id {
            Some(viewer_id) if viewer_id != user_id => {
                follow_repo.is_following(viewer_id, user_id).await?
            }
            _ => false,
        };

        Ok(Profile {
            follower_count: follow_repo.count_followers(user_id).await?,
            following_count: follow_repo.count_following(user_id).await?,
            video_count: VideoRepository::new(self.db).count_by_owner(user_id).await?,
            is_following,
            user,
        })
    }

    /// Follows `target_id`; following twice is a no-op.
    pub async fn follow(&self, user_id: i32, target_id: i32) -> Result<(), AppError> {
        if user_id == target_id {
            return Err(AppError::BadRequest("You cannot follow yourself".to_string()));
        }

        if UserRepository::new(self.db)
            .find_by_id(target_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        FollowRepository::new(self.db)
            .follow(user_id, target_id)
            .await?;
        Ok(())
    }

    pub async fn unfollow(&self, user_id: i32, target_id: i32) -> Result<(), AppError> {
        if user_id == target_id {
            return Err(AppError::BadRequest(
                "You cannot unfollow yourself".to_string(),
            ));
        }

        FollowRepository::new(self.db)
            .unfollow(user_id, target_id)
            .await?;
        Ok(())
    }
}
