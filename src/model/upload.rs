use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadDto {
    /// Temporary media URL, committed when referenced by a saved product or video
    pub url: String,
}

/// Multipart form accepted by the upload endpoint.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFormDto {
    /// Image (jpg, jpeg, png, webp, gif) or video (mp4, mov, webm), at most 50 MiB
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
