use crate::server::data::auth_token::AuthTokenRepository;
use chrono::{Duration, Utc};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

/// Tests resolving a live token to its user.
///
/// Expected: Ok(Some(User)) for the token owner
#[tokio::test]
async fn finds_user_for_live_token() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_user_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::create_user(db).await?;
    let repo = AuthTokenRepository::new(db);
    repo.create(user.id, "hash-live".to_string(), Utc::now() + Duration::days(1))
        .await?;

    let found = repo.find_user("hash-live", Utc::now()).await?;

    assert_eq!(found.map(|u| u.id), Some(user.id));

    Ok(())
}

/// Tests that expired tokens no longer authenticate and are purged.
///
/// Expected: Ok(None) from the lookup and one row deleted
#[tokio::test]
async fn ignores_and_purges_expired_token() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_user_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::create_user(db).await?;
    let repo = AuthTokenRepository::new(db);
    repo.create(user.id, "hash-old".to_string(), Utc::now() - Duration::hours(1))
        .await?;

    assert!(repo.find_user("hash-old", Utc::now()).await?.is_none());
    assert_eq!(repo.delete_expired(Utc::now()).await?, 1);

    Ok(())
}

/// Tests deleting a token on logout.
///
/// Expected: first delete returns true, second returns false
#[tokio::test]
async fn deletes_token_once() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_user_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::create_user(db).await?;
    let repo = AuthTokenRepository::new(db);
    repo.create(user.id, "hash-x".to_string(), Utc::now() + Duration::days(1))
        .await?;

    assert!(repo.delete("hash-x").await?);
    assert!(!repo.delete("hash-x").await?);

    Ok(())
}
