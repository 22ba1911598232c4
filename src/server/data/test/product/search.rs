use super::*;

/// Tests searching products by name fragment.
///
/// Expected: only matching products, with the total reflecting the match count
#[tokio::test]
async fn filters_by_query() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let shop = factory::create_shop(db).await?;
    factory::product::ProductFactory::new(db, shop.id)
        .name("Spicy Pho")
        .build()
        .await?;
    factory::product::ProductFactory::new(db, shop.id)
        .name("Pho Bo")
        .build()
        .await?;
    factory::product::ProductFactory::new(db, shop.id)
        .name("Banh Mi")
        .build()
        .await?;

    let repo = ProductRepository::new(db);
    let (products, total) = repo.search(Some("Pho"), None, 0, 10).await?;

    assert_eq!(total, 2);
    assert!(products.iter().all(|p| p.name.contains("Pho")));

    Ok(())
}

/// Tests filtering products by category.
///
/// Expected: only the product in the requested category
#[tokio::test]
async fn filters_by_category() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let shop = factory::create_shop(db).await?;
    let category = factory::create_category(db).await?;
    let categorized = factory::product::ProductFactory::new(db, shop.id)
        .category_id(category.id)
        .build()
        .await?;
    factory::create_product(db, shop.id).await?;

    let repo = ProductRepository::new(db);
    let (products, total) = repo.search(None, Some(category.id), 0, 10).await?;

    assert_eq!(total, 1);
    assert_eq!(products[0].id, categorized.id);

    Ok(())
}

/// Tests pagination of search results.
///
/// Expected: second page of size 2 holds the remaining product
#[tokio::test]
async fn paginates_results() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let shop = factory::create_shop(db).await?;
    for _ in 0..3 {
        factory::create_product(db, shop.id).await?;
    }

    let repo = ProductRepository::new(db);
    let (products, total) = repo.search(None, None, 1, 2).await?;

    assert_eq!(total, 3);
    assert_eq!(products.len(), 1);

    Ok(())
}
