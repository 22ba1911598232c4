use super::*;
use chrono::Utc;

/// Tests persisting a delivery state change.
///
/// Verifies the status log round-trips through the JSON column together with
/// the courier fields and order status.
///
/// Expected: reloaded order carries the written delivery state
#[tokio::test]
async fn persists_delivery_state() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_order_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (customer, shop, address, product, _order) =
        factory::helpers::create_order_with_dependencies(db).await?;
    let order = factory::order::OrderFactory::new(db, customer.id, shop.id, address.id)
        .item(&product, 1)
        .status("CONFIRMED")
        .build()
        .await?;

    let repo = OrderRepository::new(db);
    let current = repo.find_by_id(order.id).await?.unwrap();

    let mut update = DeliveryStateUpdate::from_order(&current);
    update.status = OrderStatus::Delivery;
    update.delivery_type = DeliveryType::Grab;
    update.courier_delivery_id = Some("IN-123".to_string());
    update.courier_tracking_url = Some("https://track.example/IN-123".to_string());
    update.status_log.apply(DeliveryStatus::Allocating, Utc::now());
    repo.update_delivery_state(order.id, update).await?;

    let reloaded = repo.find_by_id(order.id).await?.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Delivery);
    assert_eq!(reloaded.delivery_type, DeliveryType::Grab);
    assert_eq!(
        reloaded.status_log.last_status(),
        Some(DeliveryStatus::Allocating)
    );

    let by_courier = repo.find_by_courier_delivery_id("IN-123").await?.unwrap();
    assert_eq!(by_courier.id, order.id);

    Ok(())
}
