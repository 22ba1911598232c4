use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::{ErrorDto, PageDto},
        video::{
            CommentDto, CreateCommentDto, CreateVideoDto, LikeStatusDto, UpdateVideoDto, VideoDto,
        },
    },
    server::{
        error::AppError,
        model::{
            user::User,
            video::{Comment, CreateVideoParams, UpdateVideoParams, Video},
        },
        service::video::VideoService,
        state::AppState,
        util::pagination::PaginationParams,
    },
};

/// Tag for grouping video endpoints in OpenAPI documentation
pub static VIDEO_TAG: &str = "video";

/// Public videos, newest first.
#[utoipa::path(
    get,
    path = "/api/videos",
    tag = VIDEO_TAG,
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of the public feed", body = PageDto<VideoDto>),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn feed(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = VideoService::new(&state.db, &state.upload_dir)
        .feed(pagination)
        .await?;

    Ok(Json(page.into_dto(Video::into_dto)))
}

/// Public videos from users the caller follows, newest first.
#[utoipa::path(
    get,
    path = "/api/videos/following",
    tag = VIDEO_TAG,
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of the following feed", body = PageDto<VideoDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn following_feed(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = VideoService::new(&state.db, &state.upload_dir)
        .following_feed(user.id, pagination)
        .await?;

    Ok(Json(page.into_dto(Video::into_dto)))
}

/// Videos posted by one user.
///
/// Private videos are included only when the caller is that user.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/videos",
    tag = VIDEO_TAG,
    params(("user_id" = i32, Path, description = "Owner user ID"), PaginationParams),
    responses(
        (status = 200, description = "The user's videos", body = PageDto<VideoDto>),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_user_videos(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
    Path(user_id): Path<i32>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let viewer_id = viewer.map(|Extension(v)| v.id);

    let page = VideoService::new(&state.db, &state.upload_dir)
        .list_by_user(user_id, viewer_id, pagination)
        .await?;

    Ok(Json(page.into_dto(Video::into_dto)))
}

/// Publish a video.
///
/// Linked products must belong to the caller. Temporary upload URLs for the
/// video and thumbnail are committed to permanent storage.
///
/// # Returns
/// - `201 Created` - Video published
/// - `400 Bad Request` - Empty title, bad visibility or foreign products
#[utoipa::path(
    post,
    path = "/api/videos",
    tag = VIDEO_TAG,
    request_body = CreateVideoDto,
    responses(
        (status = 201, description = "Video published", body = VideoDto),
        (status = 400, description = "Invalid video data", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn create_video(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateVideoDto>,
) -> Result<impl IntoResponse, AppError> {
    let params = CreateVideoParams::from_dto(user.id, payload).map_err(AppError::BadRequest)?;

    let video = VideoService::new(&state.db, &state.upload_dir)
        .create(params)
        .await?;

    Ok((StatusCode::CREATED, Json(video.into_dto())))
}

/// Watch a video.
///
/// Each successful call counts one view. Private videos are only visible to
/// their owner and read as not found for everyone else.
#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = VIDEO_TAG,
    params(("video_id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video with the new view count", body = VideoDto),
        (status = 404, description = "Video not found", body = ErrorDto)
    ),
)]
pub async fn get_video(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
    Path(video_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let viewer_id = viewer.map(|Extension(v)| v.id);

    let video = VideoService::new(&state.db, &state.upload_dir)
        .get(video_id, viewer_id)
        .await?;

    Ok(Json(video.into_dto()))
}

#[utoipa::path(
    patch,
    path = "/api/videos/{video_id}",
    tag = VIDEO_TAG,
    params(("video_id" = i32, Path, description = "Video ID")),
    request_body = UpdateVideoDto,
    responses(
        (status = 200, description = "Video updated", body = VideoDto),
        (status = 400, description = "Invalid video data", body = ErrorDto),
        (status = 404, description = "Video not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn update_video(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<i32>,
    Json(payload): Json<UpdateVideoDto>,
) -> Result<impl IntoResponse, AppError> {
    let params =
        UpdateVideoParams::from_dto(video_id, user.id, payload).map_err(AppError::BadRequest)?;

    let video = VideoService::new(&state.db, &state.upload_dir)
        .update(params)
        .await?;

    Ok(Json(video.into_dto()))
}

#[utoipa::path(
    delete,
    path = "/api/videos/{video_id}",
    tag = VIDEO_TAG,
    params(("video_id" = i32, Path, description = "Video ID")),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 404, description = "Video not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn delete_video(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    VideoService::new(&state.db, &state.upload_dir)
        .delete(video_id, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Like a video. Liking twice counts once.
#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/like",
    tag = VIDEO_TAG,
    params(("video_id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video liked", body = LikeStatusDto),
        (status = 404, description = "Video not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn like_video(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let video = VideoService::new(&state.db, &state.upload_dir)
        .like(video_id, user.id)
        .await?;

    Ok(Json(LikeStatusDto {
        liked: true,
        like_count: video.like_count,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/videos/{video_id}/like",
    tag = VIDEO_TAG,
    params(("video_id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Like removed", body = LikeStatusDto),
        (status = 404, description = "Video not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn unlike_video(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let video = VideoService::new(&state.db, &state.upload_dir)
        .unlike(video_id, user.id)
        .await?;

    Ok(Json(LikeStatusDto {
        liked: false,
        like_count: video.like_count,
    }))
}

/// Comments on a video, oldest first.
#[utoipa::path(
    get,
    path = "/api/videos/{video_id}/comments",
    tag = VIDEO_TAG,
    params(("video_id" = i32, Path, description = "Video ID"), PaginationParams),
    responses(
        (status = 200, description = "One page of comments", body = PageDto<CommentDto>),
        (status = 404, description = "Video not found", body = ErrorDto)
    ),
)]
pub async fn list_comments(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
    Path(video_id): Path<i32>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let viewer_id = viewer.map(|Extension(v)| v.id);

    let page = VideoService::new(&state.db, &state.upload_dir)
        .list_comments(video_id, viewer_id, pagination)
        .await?;

    Ok(Json(page.into_dto(Comment::into_dto)))
}

/// Comment on a video, optionally replying to another comment on the same video.
///
/// # Returns
/// - `201 Created` - Comment posted
/// - `400 Bad Request` - Content empty or over 500 characters, or parent on another video
/// - `404 Not Found` - Video or parent comment not found
#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/comments",
    tag = VIDEO_TAG,
    params(("video_id" = i32, Path, description = "Video ID")),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment posted", body = CommentDto),
        (status = 400, description = "Invalid comment", body = ErrorDto),
        (status = 404, description = "Video or parent not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<i32>,
    Json(payload): Json<CreateCommentDto>,
) -> Result<impl IntoResponse, AppError> {
    let comment = VideoService::new(&state.db, &state.upload_dir)
        .create_comment(video_id, user.id, payload.parent_id, payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(comment.into_dto())))
}

/// Delete a comment and its replies.
///
/// # Access Control
/// - Comment author or the video's owner
#[utoipa::path(
    delete,
    path = "/api/comments/{comment_id}",
    tag = VIDEO_TAG,
    params(("comment_id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Caller may not delete this comment", body = ErrorDto),
        (status = 404, description = "Comment not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(comment_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    VideoService::new(&state.db, &state.upload_dir)
        .delete_comment(comment_id, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
