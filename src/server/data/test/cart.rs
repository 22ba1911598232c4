use crate::server::data::cart::CartRepository;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

/// Tests listing cart lines joined with their products.
///
/// Expected: one line with product details and line total 100_000
#[tokio::test]
async fn lists_lines_with_products() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let customer = factory::create_user(db).await?;
    let shop = factory::create_shop(db).await?;
    let product = factory::create_product(db, shop.id).await?;

    let repo = CartRepository::new(db);
    repo.insert(customer.id, product.id, 2).await?;

    let lines = repo.list_lines(customer.id, None).await?;

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].shop_id, shop.id);
    assert_eq!(lines[0].line_total(), 100_000);

    Ok(())
}

/// Tests restricting the listing to selected line IDs.
///
/// Expected: only the selected line is returned
#[tokio::test]
async fn filters_selected_lines() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let customer = factory::create_user(db).await?;
    let shop = factory::create_shop(db).await?;
    let first = factory::create_product(db, shop.id).await?;
    let second = factory::create_product(db, shop.id).await?;

    let repo = CartRepository::new(db);
    repo.insert(customer.id, first.id, 1).await?;
    repo.insert(customer.id, second.id, 1).await?;
    let selected = repo.find_line(customer.id, second.id).await?.unwrap();

    let lines = repo.list_lines(customer.id, Some(vec![selected.id])).await?;

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id, second.id);

    Ok(())
}

/// Tests that another user's lines cannot be deleted.
///
/// Expected: Ok(false) and the line remains
#[tokio::test]
async fn delete_requires_owner() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let customer = factory::create_user(db).await?;
    let stranger = factory::create_user(db).await?;
    let shop = factory::create_shop(db).await?;
    let product = factory::create_product(db, shop.id).await?;

    let repo = CartRepository::new(db);
    repo.insert(customer.id, product.id, 1).await?;
    let line = repo.find_line(customer.id, product.id).await?.unwrap();

    assert!(!repo.delete(line.id, stranger.id).await?);
    assert!(repo.find_owned(line.id, customer.id).await?.is_some());

    Ok(())
}
