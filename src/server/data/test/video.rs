use crate::server::data::{follow::FollowRepository, video::VideoRepository};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

/// Tests that liking twice only counts once.
///
/// Expected: first like true, second false, like_count 1
#[tokio::test]
async fn like_is_idempotent() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_video_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let owner = factory::create_user(db).await?;
    let viewer = factory::create_user(db).await?;
    let video = factory::create_video(db, owner.id).await?;

    let repo = VideoRepository::new(db);
    assert!(repo.like(video.id, viewer.id).await?);
    assert!(!repo.like(video.id, viewer.id).await?);

    let found = repo.find_by_id(video.id).await?.unwrap();
    assert_eq!(found.like_count, 1);
    assert!(repo.has_liked(video.id, viewer.id).await?);

    Ok(())
}

/// Tests that unliking keeps the counter in step with like rows.
///
/// Expected: like_count returns to 0 and a second unlike is a no-op
#[tokio::test]
async fn unlike_decrements_counter() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_video_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let owner = factory::create_user(db).await?;
    let viewer = factory::create_user(db).await?;
    let video = factory::create_video(db, owner.id).await?;

    let repo = VideoRepository::new(db);
    repo.like(video.id, viewer.id).await?;
    assert!(repo.unlike(video.id, viewer.id).await?);
    assert!(!repo.unlike(video.id, viewer.id).await?);

    let found = repo.find_by_id(video.id).await?.unwrap();
    assert_eq!(found.like_count, 0);

    Ok(())
}

/// Tests the following feed only includes public videos of followed users.
///
/// Expected: one video from the followed creator
#[tokio::test]
async fn following_feed_filters_owners_and_visibility() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_video_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let viewer = factory::create_user(db).await?;
    let followed = factory::create_user(db).await?;
    let stranger = factory::create_user(db).await?;
    let public = factory::create_video(db, followed.id).await?;
    factory::video::VideoFactory::new(db, followed.id)
        .visibility("PRIVATE")
        .build()
        .await?;
    factory::create_video(db, stranger.id).await?;

    FollowRepository::new(db)
        .follow(viewer.id, followed.id)
        .await?;
    let following = FollowRepository::new(db).following_ids(viewer.id).await?;

    let repo = VideoRepository::new(db);
    let (videos, total) = repo.list_public_by_owners(following, 0, 10).await?;

    assert_eq!(total, 1);
    assert_eq!(videos[0].id, public.id);

    Ok(())
}

/// Tests summing a creator's view counts.
///
/// Expected: 150 across both videos
#[tokio::test]
async fn sums_total_views() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_video_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let owner = factory::create_user(db).await?;
    factory::video::VideoFactory::new(db, owner.id)
        .view_count(100)
        .build()
        .await?;
    factory::video::VideoFactory::new(db, owner.id)
        .view_count(50)
        .build()
        .await?;

    let repo = VideoRepository::new(db);

    assert_eq!(repo.total_views(owner.id).await?, 150);

    Ok(())
}
