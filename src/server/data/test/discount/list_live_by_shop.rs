use super::*;

/// Tests that only active discounts are listed for a shop.
///
/// Expected: the inactive discount and other shops' discounts are excluded
#[tokio::test]
async fn excludes_inactive_and_foreign() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let shop = factory::create_shop(db).await?;
    let other_shop = factory::create_shop(db).await?;
    let live = factory::create_discount(db, shop.id).await?;
    factory::discount::DiscountFactory::new(db, shop.id)
        .active(false)
        .build()
        .await?;
    factory::create_discount(db, other_shop.id).await?;

    let repo = DiscountRepository::new(db);
    let discounts = repo.list_live_by_shop(shop.id, chrono::Utc::now()).await?;

    assert_eq!(discounts.len(), 1);
    assert_eq!(discounts[0].id, live.id);

    Ok(())
}

/// Tests that scoped product IDs are loaded with the discount.
///
/// Expected: product_ids contains the scoped product
#[tokio::test]
async fn loads_product_scope() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let shop = factory::create_shop(db).await?;
    let product = factory::create_product(db, shop.id).await?;
    factory::discount::DiscountFactory::new(db, shop.id)
        .product(product.id)
        .build()
        .await?;

    let repo = DiscountRepository::new(db);
    let discounts = repo.list_live_by_shop(shop.id, chrono::Utc::now()).await?;

    assert_eq!(discounts[0].product_ids, vec![product.id]);

    Ok(())
}
