use crate::server::data::comment::CommentRepository;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

/// Tests that deleting a comment removes its whole reply tree.
///
/// Expected: 3 comments removed, the unrelated comment survives
#[tokio::test]
async fn deletes_reply_tree() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_video_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let owner = factory::create_user(db).await?;
    let video = factory::create_video(db, owner.id).await?;

    let repo = CommentRepository::new(db);
    let root = repo
        .create(video.id, owner.id, None, "root".to_string())
        .await?;
    let reply = repo
        .create(video.id, owner.id, Some(root.id), "reply".to_string())
        .await?;
    repo.create(video.id, owner.id, Some(reply.id), "nested".to_string())
        .await?;
    let other = repo
        .create(video.id, owner.id, None, "other".to_string())
        .await?;

    let removed = repo.delete_thread(root.id).await?;

    assert_eq!(removed, 3);
    let (remaining, total) = repo.list_by_video(video.id, 0, 10).await?;
    assert_eq!(total, 1);
    assert_eq!(remaining[0].id, other.id);

    Ok(())
}

/// Tests that comments are listed oldest first.
///
/// Expected: creation order is preserved
#[tokio::test]
async fn lists_oldest_first() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_video_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let owner = factory::create_user(db).await?;
    let video = factory::create_video(db, owner.id).await?;

    let repo = CommentRepository::new(db);
    let first = repo
        .create(video.id, owner.id, None, "first".to_string())
        .await?;
    let second = repo
        .create(video.id, owner.id, None, "second".to_string())
        .await?;

    let (comments, _) = repo.list_by_video(video.id, 0, 10).await?;

    assert_eq!(
        comments.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );

    Ok(())
}
