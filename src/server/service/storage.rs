//! Local media storage.
//!
//! Uploads land in `{upload_dir}/tmp` and are only moved to `{upload_dir}/files`
//! once a saved product or video references them. Unclaimed temporary files are
//! removed by the scheduled cleanup.

use chrono::Duration;
use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};
use uuid::Uuid;

use crate::server::error::AppError;

pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "webp", "gif", "mp4", "mov", "webm"];

const TMP_URL_PREFIX: &str = "/media/tmp/";
const FILES_URL_PREFIX: &str = "/media/files/";

pub struct StorageService<'a> {
    upload_dir: &'a Path,
}

impl<'a> StorageService<'a> {
    pub fn new(upload_dir: &'a Path) -> Self {
        Self { upload_dir }
    }

    fn tmp_dir(&self) -> PathBuf {
        self.upload_dir.join("tmp")
    }

    fn files_dir(&self) -> PathBuf {
        self.upload_dir.join("files")
    }

    /// Stores an uploaded file under a fresh name in the temporary area.
    ///
    /// # Arguments
    /// - `file_name` - Client supplied name, used only for its extension
    /// - `bytes` - File contents
    ///
    /// # Returns
    /// - `Ok(String)` - Temporary media URL (`/media/tmp/{uuid}.{ext}`)
    /// - `Err(AppError::BadRequest)` - Empty, too large or unsupported file type
    pub async fn save_upload(&self, file_name: Option<&str>, bytes: &[u8]) -> Result<String, AppError> {
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::BadRequest(
                "Uploaded file exceeds the 50 MiB limit".to_string(),
            ));
        }

        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Unsupported file type, allowed: {}",
                    ALLOWED_EXTENSIONS.join(", ")
                ))
            })?;

        let name = format!("{}.{}", Uuid::new_v4(), extension);
        let tmp_dir = self.tmp_dir();
        tokio::fs::create_dir_all(&tmp_dir).await?;
        tokio::fs::write(tmp_dir.join(&name), bytes).await?;

        Ok(format!("{}{}", TMP_URL_PREFIX, name))
    }

    /// Moves a temporary upload to permanent storage.
    ///
    /// URLs outside `/media/tmp/` (already committed, or external) are returned
    /// unchanged.
    ///
    /// # Returns
    /// - `Ok(String)` - The permanent URL
    /// - `Err(AppError::BadRequest)` - The temporary file does not exist or the name is invalid
    pub async fn commit(&self, url: &str) -> Result<String, AppError> {
        let Some(name) = url.strip_prefix(TMP_URL_PREFIX) else {
            return Ok(url.to_string());
        };

        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(AppError::BadRequest(format!("Invalid media URL '{}'", url)));
        }

        let source = self.tmp_dir().join(name);
        if !tokio::fs::try_exists(&source).await? {
            return Err(AppError::BadRequest(format!(
                "Upload '{}' was not found or has expired",
                url
            )));
        }

        let files_dir = self.files_dir();
        tokio::fs::create_dir_all(&files_dir).await?;
        tokio::fs::rename(&source, files_dir.join(name)).await?;

        Ok(format!("{}{}", FILES_URL_PREFIX, name))
    }

    pub async fn commit_optional(&self, url: Option<String>) -> Result<Option<String>, AppError> {
        match url {
            Some(url) => Ok(Some(self.commit(&url).await?)),
            None => Ok(None),
        }
    }

    /// Deletes temporary uploads last modified more than `retention` ago.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of files removed
    pub async fn cleanup_tmp(&self, retention: Duration) -> Result<u64, AppError> {
        let tmp_dir = self.tmp_dir();
        if !tokio::fs::try_exists(&tmp_dir).await? {
            return Ok(0);
        }

        let retention = retention.to_std().unwrap_or_default();
        let now = SystemTime::now();
        let mut removed = 0;

        let mut entries = tokio::fs::read_dir(&tmp_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let age = now
                .duration_since(metadata.modified()?)
                .unwrap_or_default();
            if age >= retention {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests storing an upload in the temporary area.
    ///
    /// Expected: file written under tmp/ with a lowercase whitelisted extension
    #[tokio::test]
    async fn saves_upload_to_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());

        let url = storage
            .save_upload(Some("Dish.JPG"), b"image-bytes")
            .await
            .unwrap();

        assert!(url.starts_with("/media/tmp/"));
        assert!(url.ends_with(".jpg"));
        let name = url.trim_start_matches("/media/tmp/");
        assert!(dir.path().join("tmp").join(name).exists());
    }

    /// Tests rejection of unsupported or empty uploads.
    ///
    /// Expected: BadRequest for each
    #[tokio::test]
    async fn rejects_invalid_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());

        assert!(matches!(
            storage.save_upload(Some("script.sh"), b"#!").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            storage.save_upload(None, b"data").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            storage.save_upload(Some("a.png"), b"").await,
            Err(AppError::BadRequest(_))
        ));
    }

    /// Tests committing a temporary upload.
    ///
    /// Expected: file moved to files/ and other URLs returned unchanged
    #[tokio::test]
    async fn commits_temporary_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());

        let tmp_url = storage.save_upload(Some("clip.mp4"), b"video").await.unwrap();
        let committed = storage.commit(&tmp_url).await.unwrap();

        let name = committed.trim_start_matches("/media/files/");
        assert!(committed.starts_with("/media/files/"));
        assert!(dir.path().join("files").join(name).exists());
        assert!(!dir.path().join("tmp").join(name).exists());

        assert_eq!(storage.commit(&committed).await.unwrap(), committed);
        assert_eq!(
            storage.commit("https://cdn.example.com/a.png").await.unwrap(),
            "https://cdn.example.com/a.png"
        );
    }

    /// Tests committing a missing or malicious temporary URL.
    ///
    /// Expected: BadRequest
    #[tokio::test]
    async fn rejects_unknown_temporary_urls() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());

        assert!(matches!(
            storage.commit("/media/tmp/missing.png").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            storage.commit("/media/tmp/../secret").await,
            Err(AppError::BadRequest(_))
        ));
    }

    /// Tests cleanup of expired temporary files.
    ///
    /// Expected: zero retention removes everything, a long retention keeps files
    #[tokio::test]
    async fn cleans_up_expired_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());

        storage.save_upload(Some("a.png"), b"a").await.unwrap();
        storage.save_upload(Some("b.png"), b"b").await.unwrap();

        assert_eq!(storage.cleanup_tmp(Duration::hours(24)).await.unwrap(), 0);
        assert_eq!(storage.cleanup_tmp(Duration::zero()).await.unwrap(), 2);
        assert_eq!(storage.cleanup_tmp(Duration::zero()).await.unwrap(), 0);
    }
}
