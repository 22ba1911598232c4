use super::*;

/// Tests creating an order with items.
///
/// Verifies the order starts pending and unpaid with an empty delivery log and
/// that the total is subtotal minus discounts plus the delivery fee.
///
/// Expected: Ok with status PENDING, delivery type NONE and total 95_000
#[tokio::test]
async fn creates_pending_order() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let customer = factory::create_user(db).await?;
    let shop = factory::create_shop(db).await?;
    let address = factory::create_address(db, customer.id).await?;
    let product = factory::create_product(db, shop.id).await?;

    let repo = OrderRepository::new(db);
    let order = repo
        .create(NewOrder {
            tracking_id: "ABCDEF123456".to_string(),
            user_id: customer.id,
            shop_id: shop.id,
            address_id: address.id,
            payment_method: PaymentMethod::Cod,
            items: vec![OrderItem {
                product_id: product.id,
                product_name: product.name.clone(),
                price: 50_000,
                quantity: 2,
            }],
            discounts: Vec::new(),
            subtotal: 100_000,
            discount_total: 20_000,
            delivery_fee: 15_000,
            delivery_method: DeliveryMethod::SelfDelivery,
            note: None,
        })
        .await?;

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.delivery_type, DeliveryType::None);
    assert!(order.status_log.entries().is_empty());
    assert!(!order.is_paid);
    assert_eq!(order.total, 95_000);
    assert_eq!(order.items.len(), 1);

    let found = repo.find_by_id(order.id).await?.unwrap();
    assert_eq!(found.total, order.total);
    assert_eq!(found.items, order.items);
    assert!(repo.tracking_id_exists("ABCDEF123456").await?);

    Ok(())
}

/// Tests deleting orders with their child rows.
///
/// Expected: the order and its items are gone, other orders are untouched
#[tokio::test]
async fn deletes_orders_with_items() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_customer, _shop, _address, _product, order) =
        factory::helpers::create_order_with_dependencies(db).await?;
    let (_, _, _, _, kept) = factory::helpers::create_order_with_dependencies(db).await?;

    let repo = OrderRepository::new(db);
    assert_eq!(repo.delete_many(vec![order.id]).await?, 1);
    assert_eq!(repo.delete_many(Vec::new()).await?, 0);

    assert!(repo.find_by_id(order.id).await?.is_none());
    assert!(repo.find_by_id(kept.id).await?.is_some());

    Ok(())
}
