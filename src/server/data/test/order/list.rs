use super::*;

/// Tests listing a customer's orders filtered by status.
///
/// Expected: only the confirmed order is returned
#[tokio::test]
async fn filters_user_orders_by_status() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (customer, shop, address, product, _pending) =
        factory::helpers::create_order_with_dependencies(db).await?;
    let confirmed = factory::order::OrderFactory::new(db, customer.id, shop.id, address.id)
        .item(&product, 1)
        .status("CONFIRMED")
        .build()
        .await?;

    let repo = OrderRepository::new(db);
    let all = repo.list_by_user(customer.id, None).await?;
    let filtered = repo
        .list_by_user(customer.id, Some(OrderStatus::Confirmed))
        .await?;

    assert_eq!(all.len(), 2);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, confirmed.id);

    Ok(())
}

/// Tests that a shop only sees its own orders.
///
/// Expected: the other shop's order is excluded
#[tokio::test]
async fn lists_shop_orders() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_customer, shop, _address, _product, order) =
        factory::helpers::create_order_with_dependencies(db).await?;
    factory::helpers::create_order_with_dependencies(db).await?;

    let repo = OrderRepository::new(db);
    let orders = repo.list_by_shop(shop.id, None).await?;

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order.id);
    assert_eq!(orders[0].items.len(), 1);

    Ok(())
}
