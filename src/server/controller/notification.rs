use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::ErrorDto,
        notification::{MarkAllReadDto, NotificationDto, NotificationQuery},
    },
    server::{
        error::AppError,
        model::{notification::Notification, user::User},
        service::notification::NotificationService,
        state::AppState,
    },
};

/// Tag for grouping notification endpoints in OpenAPI documentation
pub static NOTIFICATION_TAG: &str = "notification";

/// GET /api/notifications - The caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = NOTIFICATION_TAG,
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications", body = Vec<NotificationDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = NotificationService::new(&state.db)
        .list(user.id, query.unread_only)
        .await?;

    Ok(Json(
        notifications
            .into_iter()
            .map(Notification::into_dto)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{notification_id}/read",
    tag = NOTIFICATION_TAG,
    params(("notification_id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 404, description = "Notification not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(notification_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    NotificationService::new(&state.db)
        .mark_read(notification_id, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = NOTIFICATION_TAG,
    responses(
        (status = 200, description = "Number of notifications marked", body = MarkAllReadDto)
    ),
    security(("bearer" = []))
)]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let updated = NotificationService::new(&state.db)
        .mark_all_read(user.id)
        .await?;

    Ok(Json(MarkAllReadDto { updated }))
}
