use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{
    data::auth_token::AuthTokenRepository,
    error::AppError,
    service::{analytics::AnalyticsService, storage::StorageService},
};

/// Starts the maintenance scheduler
///
/// Two jobs are registered:
/// - Every 15 minutes: recompute today's and yesterday's analytics for every shop
/// - Hourly: delete stale temporary uploads and purge expired bearer tokens
///
/// # Arguments
/// - `db`: Database connection
/// - `upload_dir`: Root of the media directory
/// - `tmp_retention_hours`: Age after which unclaimed uploads are removed
pub async fn start_scheduler(
    db: DatabaseConnection,
    upload_dir: PathBuf,
    tmp_retention_hours: i64,
) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    let rollup_db = db.clone();
    let rollup_job = Job::new_async("0 */15 * * * *", move |_uuid, _lock| {
        let db = rollup_db.clone();

        Box::pin(async move {
            match AnalyticsService::new(&db).rollup().await {
                Ok(count) => tracing::debug!("Analytics rollup refreshed {} rows", count),
                Err(e) => tracing::error!("Error rolling up analytics: {}", e),
            }
        })
    })?;

    let cleanup_db = db.clone();
    let cleanup_job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let db = cleanup_db.clone();
        let upload_dir = upload_dir.clone();

        Box::pin(async move {
            if let Err(e) = process_cleanup(&db, &upload_dir, tmp_retention_hours).await {
                tracing::error!("Error running cleanup: {}", e);
            }
        })
    })?;

    scheduler.add(rollup_job).await?;
    scheduler.add(cleanup_job).await?;
    scheduler.start().await?;

    tracing::info!("Maintenance scheduler started");

    Ok(())
}

/// Removes stale temporary uploads and expired tokens.
///
/// Each step runs even when the other fails.
pub async fn process_cleanup(
    db: &DatabaseConnection,
    upload_dir: &std::path::Path,
    tmp_retention_hours: i64,
) -> Result<(), AppError> {
    match StorageService::new(upload_dir)
        .cleanup_tmp(Duration::hours(tmp_retention_hours))
        .await
    {
        Ok(0) => {}
        Ok(removed) => tracing::info!("Removed {} stale temporary uploads", removed),
        Err(e) => tracing::error!("Error cleaning temporary uploads: {}", e),
    }

    let purged = AuthTokenRepository::new(db).delete_expired(Utc::now()).await?;
    if purged > 0 {
        tracing::info!("Purged {} expired auth tokens", purged);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    /// Tests that cleanup removes expired tokens and stale uploads together.
    ///
    /// Expected: expired token gone, live token kept, old tmp file deleted
    #[tokio::test]
    async fn cleans_tokens_and_uploads() {
        let test = TestBuilder::new().with_user_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let user = factory::create_user(db).await.unwrap();
        let repo = AuthTokenRepository::new(db);
        repo.create(user.id, "expired".to_string(), Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        repo.create(user.id, "live".to_string(), Utc::now() + Duration::days(1))
            .await
            .unwrap();

        tokio::fs::create_dir_all(dir.path().join("tmp")).await.unwrap();
        tokio::fs::write(dir.path().join("tmp/old.png"), b"png")
            .await
            .unwrap();

        // zero retention treats every temporary file as stale
        process_cleanup(db, dir.path(), 0).await.unwrap();

        assert!(repo.find_user("expired", Utc::now()).await.unwrap().is_none());
        assert!(repo.find_user("live", Utc::now()).await.unwrap().is_some());
        assert!(!dir.path().join("tmp/old.png").exists());
    }
}
