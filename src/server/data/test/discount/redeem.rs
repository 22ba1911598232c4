use super::*;

/// Tests redeeming an uncapped discount.
///
/// Verifies that both the global counter and the user's usage are recorded.
///
/// Expected: Ok(true), used_count 1 and user usage 1
#[tokio::test]
async fn records_usage() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let customer = factory::create_user(db).await?;
    let shop = factory::create_shop(db).await?;
    let discount = factory::create_discount(db, shop.id).await?;

    let repo = DiscountRepository::new(db);
    let redeemed = repo.redeem(discount.id, customer.id).await?;

    assert!(redeemed);
    let found = repo.find_by_id(discount.id).await?.unwrap();
    assert_eq!(found.used_count, 1);
    assert_eq!(repo.user_usage(discount.id, customer.id).await?, 1);

    Ok(())
}

/// Tests that redemption stops at the global cap.
///
/// Expected: Ok(false) and used_count stays at max_uses
#[tokio::test]
async fn refuses_past_global_cap() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let customer = factory::create_user(db).await?;
    let shop = factory::create_shop(db).await?;
    let discount = factory::discount::DiscountFactory::new(db, shop.id)
        .max_uses(2, 2)
        .build()
        .await?;

    let repo = DiscountRepository::new(db);
    let redeemed = repo.redeem(discount.id, customer.id).await?;

    assert!(!redeemed);
    let found = repo.find_by_id(discount.id).await?.unwrap();
    assert_eq!(found.used_count, 2);
    assert_eq!(repo.user_usage(discount.id, customer.id).await?, 0);

    Ok(())
}

/// Tests that releasing a redemption gives the use back.
///
/// Expected: used_count and user usage return to 0
#[tokio::test]
async fn release_restores_counters() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let customer = factory::create_user(db).await?;
    let shop = factory::create_shop(db).await?;
    let discount = factory::create_discount(db, shop.id).await?;

    let repo = DiscountRepository::new(db);
    assert!(repo.redeem(discount.id, customer.id).await?);
    repo.release(discount.id, customer.id).await?;

    let found = repo.find_by_id(discount.id).await?.unwrap();
    assert_eq!(found.used_count, 0);
    assert_eq!(repo.user_usage(discount.id, customer.id).await?, 0);

    Ok(())
}
