use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::ErrorDto,
        upload::{UploadDto, UploadFormDto},
    },
    server::{error::AppError, model::user::User, service::storage::StorageService, state::AppState},
};

/// Tag for grouping upload endpoints in OpenAPI documentation
pub static UPLOAD_TAG: &str = "upload";

const FILE_FIELD: &str = "file";

/// Upload an image or video.
///
/// The file is kept in temporary storage and becomes permanent once a product
/// or video references the returned URL. Unreferenced uploads are removed by
/// the hourly cleanup.
///
/// # Returns
/// - `201 Created` - Temporary media URL
/// - `400 Bad Request` - Missing `file` field, empty file, unsupported type or over 50 MiB
#[utoipa::path(
    post,
    path = "/api/uploads",
    tag = UPLOAD_TAG,
    request_body(content = UploadFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = UploadDto),
        (status = 400, description = "Invalid upload", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let url = StorageService::new(&state.upload_dir)
            .save_upload(file_name.as_deref(), &bytes)
            .await?;

        tracing::debug!("User {} uploaded {} bytes to {}", user.id, bytes.len(), url);

        return Ok((StatusCode::CREATED, Json(UploadDto { url })));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}
