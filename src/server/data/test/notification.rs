use crate::server::data::notification::NotificationRepository;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

/// Tests the unread filter and marking notifications read.
///
/// Expected: one unread after mark_read, none after mark_all_read
#[tokio::test]
async fn marks_notifications_read() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::create_user(db).await?;
    let repo = NotificationRepository::new(db);
    let first = repo.create(user.id, "Order placed", "a").await?;
    repo.create(user.id, "Order confirmed", "b").await?;

    assert!(repo.mark_read(first.id, user.id).await?);
    assert_eq!(repo.list(user.id, true).await?.len(), 1);

    assert_eq!(repo.mark_all_read(user.id).await?, 1);
    assert!(repo.list(user.id, true).await?.is_empty());
    assert_eq!(repo.list(user.id, false).await?.len(), 2);

    Ok(())
}

/// Tests that users cannot mark someone else's notification.
///
/// Expected: Ok(false)
#[tokio::test]
async fn mark_read_requires_owner() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::create_user(db).await?;
    let other = factory::create_user(db).await?;
    let repo = NotificationRepository::new(db);
    let notification = repo.create(user.id, "Hello", "body").await?;

    assert!(!repo.mark_read(notification.id, other.id).await?);

    Ok(())
}
