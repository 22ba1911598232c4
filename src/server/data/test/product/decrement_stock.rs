use super::*;

/// Tests decrementing stock when enough units are available.
///
/// Expected: Ok(true) and the quantity drops by the requested amount
#[tokio::test]
async fn decrements_when_stock_suffices() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_catalog_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let shop = factory::create_shop(db).await?;
    let product = factory::product::ProductFactory::new(db, shop.id)
        .quantity(5)
        .build()
        .await?;

    let repo = ProductRepository::new(db);
    let result = repo.decrement_stock(product.id, 3).await?;

    assert!(result);
    let updated = repo.find_by_id(product.id).await?.unwrap();
    assert_eq!(updated.quantity, 2);

    Ok(())
}

/// Tests that a decrement larger than the stock is refused.
///
/// The conditional update must leave the quantity untouched rather than
/// letting it go negative.
///
/// Expected: Ok(false) and the quantity is unchanged
#[tokio::test]
async fn refuses_when_stock_insufficient() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_catalog_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let shop = factory::create_shop(db).await?;
    let product = factory::product::ProductFactory::new(db, shop.id)
        .quantity(2)
        .build()
        .await?;

    let repo = ProductRepository::new(db);
    let result = repo.decrement_stock(product.id, 3).await?;

    assert!(!result);
    let updated = repo.find_by_id(product.id).await?.unwrap();
    assert_eq!(updated.quantity, 2);

    Ok(())
}

/// Tests that restoring stock adds the units back.
///
/// Expected: quantity returns to its original value
#[tokio::test]
async fn increment_restores_stock() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_catalog_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let shop = factory::create_shop(db).await?;
    let product = factory::product::ProductFactory::new(db, shop.id)
        .quantity(4)
        .build()
        .await?;

    let repo = ProductRepository::new(db);
    assert!(repo.decrement_stock(product.id, 4).await?);
    repo.increment_stock(product.id, 4).await?;

    let updated = repo.find_by_id(product.id).await?.unwrap();
    assert_eq!(updated.quantity, 4);

    Ok(())
}
