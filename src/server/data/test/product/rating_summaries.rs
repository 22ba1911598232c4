use super::*;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue};

/// Tests the rating summary over several reviews.
///
/// Ratings 5, 4 and 4 average to 4.33 after rounding to two decimals.
///
/// Expected: average 4.33, count 3
#[tokio::test]
async fn averages_ratings_to_two_decimals() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_customer, _shop, _address, product, order) =
        factory::helpers::create_order_with_dependencies(db).await?;

    for rating in [5, 4, 4] {
        let reviewer = factory::create_user(db).await?;
        entity::review::ActiveModel {
            user_id: ActiveValue::Set(reviewer.id),
            product_id: ActiveValue::Set(product.id),
            order_id: ActiveValue::Set(order.id),
            rating: ActiveValue::Set(rating),
            content: ActiveValue::Set("tasty".to_string()),
            created_at: ActiveValue::Set(Utc::now()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    let repo = ProductRepository::new(db);
    let found = repo.find_by_id(product.id).await?.unwrap();

    assert_eq!(found.rating.count, 3);
    assert_eq!(found.rating.average, 4.33);

    Ok(())
}

/// Tests the summary of a product with no reviews.
///
/// Expected: average 0.0, count 0
#[tokio::test]
async fn empty_without_reviews() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let shop = factory::create_shop(db).await?;
    let product = factory::create_product(db, shop.id).await?;

    let repo = ProductRepository::new(db);
    let found = repo.find_by_id(product.id).await?.unwrap();

    assert_eq!(found.rating.count, 0);
    assert_eq!(found.rating.average, 0.0);

    Ok(())
}
