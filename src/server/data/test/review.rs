use crate::server::{data::review::ReviewRepository, model::review::UpsertReviewParams};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

/// Tests that a second review of the same order line updates the first.
///
/// Expected: one review with the latest rating and content
#[tokio::test]
async fn upsert_updates_existing_review() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (customer, _shop, _address, product, order) =
        factory::helpers::create_order_with_dependencies(db).await?;

    let repo = ReviewRepository::new(db);
    let first = repo
        .upsert(UpsertReviewParams {
            user_id: customer.id,
            order_id: order.id,
            product_id: product.id,
            rating: 3,
            content: "ok".to_string(),
        })
        .await?;
    let second = repo
        .upsert(UpsertReviewParams {
            user_id: customer.id,
            order_id: order.id,
            product_id: product.id,
            rating: 5,
            content: "great".to_string(),
        })
        .await?;

    assert_eq!(first.id, second.id);
    let (reviews, total) = repo.list_by_product(product.id, 0, 10).await?;
    assert_eq!(total, 1);
    assert_eq!(reviews[0].rating, 5);
    assert_eq!(reviews[0].content, "great");

    Ok(())
}
