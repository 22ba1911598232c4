use sea_orm::ConnectionTrait;
use test_utils::{builder::TestBuilder, factory};

use super::*;
use crate::server::{
    data::notification::NotificationRepository, model::delivery::DeliveryMethod,
};

/// A customer with a located address and a shop with self-delivery configured.
struct Market {
    customer: entity::user::Model,
    shop: entity::user::Model,
    address: entity::address::Model,
}

async fn market(db: &DatabaseConnection) -> Market {
    let customer = factory::create_user(db).await.unwrap();
    let shop = factory::create_shop(db).await.unwrap();
    let address = factory::create_address(db, customer.id).await.unwrap();
    let pickup = factory::address::AddressFactory::new(db, shop.id)
        .coordinates(Some((10.7769, 106.7009)))
        .build()
        .await
        .unwrap();
    factory::delivery_option::create_delivery_option(db, shop.id, pickup.id)
        .await
        .unwrap();

    Market {
        customer,
        shop,
        address,
    }
}

/// Adds the product to the customer's cart and returns the line id.
async fn add_to_cart(db: &DatabaseConnection, user_id: i32, product_id: i32, quantity: i32) -> i32 {
    let cart = CartService::new(db)
        .add(user_id, product_id, quantity)
        .await
        .unwrap();
    cart.shops
        .iter()
        .flat_map(|s| &s.items)
        .find(|l| l.product_id == product_id)
        .unwrap()
        .id
}

fn checkout(m: &Market, cart_item_ids: Vec<i32>, payment_method: PaymentMethod) -> CreateOrderParams {
    CreateOrderParams {
        user_id: m.customer.id,
        cart_item_ids,
        address_id: m.address.id,
        payment_method,
        delivery_method: DeliveryMethod::SelfDelivery,
        discount_ids: Vec::new(),
        card_id: None,
        note: None,
    }
}

async fn stock(db: &DatabaseConnection, product_id: i32) -> i32 {
    ProductRepository::new(db)
        .find_by_id(product_id)
        .await
        .unwrap()
        .unwrap()
        .quantity
}

/// Tests quoting a cart that spans two shops.
///
/// Expected: one quote per shop; the shop with a tariff offers SELF, the other
/// offers nothing without a courier
#[tokio::test]
async fn quotes_each_shop() {
    let test = TestBuilder::new().with_order_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let m = market(db).await;
    let other_shop = factory::create_shop(db).await.unwrap();
    let first = factory::create_product(db, m.shop.id).await.unwrap();
    let second = factory::create_product(db, other_shop.id).await.unwrap();
    let a = add_to_cart(db, m.customer.id, first.id, 2).await;
    let b = add_to_cart(db, m.customer.id, second.id, 1).await;

    let quotes = OrderService::new(db, None, None, None)
        .quote(m.customer.id, vec![a, b], m.address.id)
        .await
        .unwrap();

    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].shop_id, m.shop.id);
    assert_eq!(quotes[0].subtotal, first.price * 2);
    assert_eq!(quotes[0].delivery_options.len(), 1);
    assert!(quotes[1].delivery_options.is_empty());
}

/// Tests a cash-on-delivery checkout.
///
/// Expected: pending unpaid order with a 12 character tracking id, stock
/// decremented, cart line removed and the shop notified
#[tokio::test]
async fn places_cod_order() {
    let test = TestBuilder::new().with_order_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let m = market(db).await;
    let product = factory::create_product(db, m.shop.id).await.unwrap();
    let line = add_to_cart(db, m.customer.id, product.id, 3).await;

    let result = OrderService::new(db, None, None, None)
        .create(checkout(&m, vec![line], PaymentMethod::Cod), "127.0.0.1")
        .await
        .unwrap();

    assert!(result.payment_url.is_none());
    let order = &result.orders[0];
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.tracking_id.len(), 12);
    assert!(!order.is_paid);
    assert_eq!(order.subtotal, product.price * 3);
    assert!(order.delivery_fee >= 15_000);
    assert_eq!(order.total, order.subtotal + order.delivery_fee);

    assert_eq!(stock(db, product.id).await, product.quantity - 3);
    assert!(CartService::new(db).get(m.customer.id).await.unwrap().shops.is_empty());
    assert_eq!(
        NotificationRepository::new(db).list(m.shop.id, false).await.unwrap().len(),
        1
    );
}

/// Tests a checkout with a shop discount.
///
/// Expected: 10% taken off the subtotal and one use recorded
#[tokio::test]
async fn applies_discounts() {
    let test = TestBuilder::new().with_order_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let m = market(db).await;
    let product = factory::create_product(db, m.shop.id).await.unwrap();
    let discount = factory::create_discount(db, m.shop.id).await.unwrap();
    let line = add_to_cart(db, m.customer.id, product.id, 2).await;

    let mut params = checkout(&m, vec![line], PaymentMethod::Cod);
    params.discount_ids = vec![discount.id];
    let result = OrderService::new(db, None, None, None)
        .create(params, "127.0.0.1")
        .await
        .unwrap();

    let order = &result.orders[0];
    assert_eq!(order.discount_total, product.price * 2 / 10);
    assert_eq!(order.discounts[0].discount_id, discount.id);

    let discounts = DiscountRepository::new(db);
    assert_eq!(discounts.user_usage(discount.id, m.customer.id).await.unwrap(), 1);
}

/// Tests that a checkout over the available stock is refused.
///
/// Expected: Err(Conflict) and the stock untouched
#[tokio::test]
async fn refuses_insufficient_stock() {
    let test = TestBuilder::new().with_order_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let m = market(db).await;
    let product = factory::product::ProductFactory::new(db, m.shop.id)
        .quantity(5)
        .build()
        .await
        .unwrap();
    let line = add_to_cart(db, m.customer.id, product.id, 5).await;
    ProductRepository::new(db).decrement_stock(product.id, 3).await.unwrap();

    let result = OrderService::new(db, None, None, None)
        .create(checkout(&m, vec![line], PaymentMethod::Cod), "127.0.0.1")
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(stock(db, product.id).await, 2);
}

/// Tests card checkout.
///
/// Expected: orders paid and linked to a payment; missing card is 400
#[tokio::test]
async fn pays_by_card() {
    let test = TestBuilder::new().with_order_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let m = market(db).await;
    let product = factory::create_product(db, m.shop.id).await.unwrap();
    let card = factory::payment::create_card(db, m.customer.id, true).await.unwrap();
    let line = add_to_cart(db, m.customer.id, product.id, 1).await;
    let service = OrderService::new(db, None, None, None);

    let missing = service
        .create(checkout(&m, vec![line], PaymentMethod::Card), "127.0.0.1")
        .await;
    assert!(matches!(missing, Err(AppError::BadRequest(_))));

    let mut params = checkout(&m, vec![line], PaymentMethod::Card);
    params.card_id = Some(card.id);
    let result = service.create(params, "127.0.0.1").await.unwrap();

    let order = service.get(result.orders[0].id, m.customer.id).await.unwrap();
    assert!(order.is_paid);
    assert!(order.payment_id.is_some());
}

/// Tests a card checkout whose payment cannot be written.
///
/// Expected: Err, no order left behind, stock and discount usage back to their
/// previous values and the cart line still in the cart
#[tokio::test]
async fn undoes_failed_checkout() {
    let test = TestBuilder::new().with_order_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let m = market(db).await;
    let product = factory::create_product(db, m.shop.id).await.unwrap();
    let discount = factory::create_discount(db, m.shop.id).await.unwrap();
    let card = factory::payment::create_card(db, m.customer.id, true).await.unwrap();
    let line = add_to_cart(db, m.customer.id, product.id, 2).await;
    db.execute_unprepared(
        "CREATE TRIGGER reject_payments BEFORE INSERT ON payment \
         BEGIN SELECT RAISE(ABORT, 'payments offline'); END;",
    )
    .await
    .unwrap();
    let service = OrderService::new(db, None, None, None);

    let mut params = checkout(&m, vec![line], PaymentMethod::Card);
    params.card_id = Some(card.id);
    params.discount_ids = vec![discount.id];
    let result = service.create(params, "127.0.0.1").await;

    assert!(matches!(result, Err(AppError::DbErr(_))));
    assert_eq!(stock(db, product.id).await, product.quantity);
    let discounts = DiscountRepository::new(db);
    let after = discounts.find_by_id(discount.id).await.unwrap().unwrap();
    assert_eq!(after.used_count, discount.used_count);
    assert_eq!(discounts.user_usage(discount.id, m.customer.id).await.unwrap(), 0);
    assert!(service.list_mine(m.customer.id, None).await.unwrap().is_empty());
    assert_eq!(CartService::new(db).get(m.customer.id).await.unwrap().shops.len(), 1);
}

/// Tests gateway checkout and confirmation.
///
/// Expected: payment URL returned, order unpaid and not confirmable until paid
#[tokio::test]
async fn waits_for_gateway_payment() {
    let test = TestBuilder::new().with_order_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let m = market(db).await;
    let product = factory::create_product(db, m.shop.id).await.unwrap();
    let line = add_to_cart(db, m.customer.id, product.id, 1).await;
    let gateway = PaymentGatewayConfig {
        tmn_code: "TASTE001".to_string(),
        hash_secret: "SECRETKEY".to_string(),
        payment_url: "https://pay.example/vpcpay.html".to_string(),
        return_url: "http://localhost:8080/api/payments/gateway/return".to_string(),
    };
    let service = OrderService::new(db, None, None, Some(&gateway));

    let result = service
        .create(checkout(&m, vec![line], PaymentMethod::Gateway), "127.0.0.1")
        .await
        .unwrap();

    let url = result.payment_url.unwrap();
    assert!(url.starts_with("https://pay.example/vpcpay.html?"));
    let order = &result.orders[0];
    assert!(!order.is_paid);

    assert!(matches!(
        service.confirm(order.id, m.shop.id).await,
        Err(AppError::Conflict(_))
    ));
}

/// Tests cancellation rules and what a cancellation gives back.
///
/// Expected: customer cannot cancel a confirmed order; the shop can, which
/// restores stock and discount usage
#[tokio::test]
async fn cancels_orders() {
    let test = TestBuilder::new().with_order_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let m = market(db).await;
    let product = factory::create_product(db, m.shop.id).await.unwrap();
    let discount = factory::create_discount(db, m.shop.id).await.unwrap();
    let line = add_to_cart(db, m.customer.id, product.id, 4).await;
    let service = OrderService::new(db, None, None, None);

    let mut params = checkout(&m, vec![line], PaymentMethod::Cod);
    params.discount_ids = vec![discount.id];
    let order = service.create(params, "127.0.0.1").await.unwrap().orders.remove(0);

    let confirmed = service.confirm(order.id, m.shop.id).await.unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);

    assert!(matches!(
        service.cancel(order.id, m.customer.id).await,
        Err(AppError::Conflict(_))
    ));

    let cancelled = service.cancel(order.id, m.shop.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock(db, product.id).await, product.quantity);
    assert_eq!(
        DiscountRepository::new(db)
            .user_usage(discount.id, m.customer.id)
            .await
            .unwrap(),
        0
    );
}

/// Tests completing a self-delivered order.
///
/// Expected: 409 before dispatch, COMPLETED and paid after
#[tokio::test]
async fn completes_self_delivery() {
    let test = TestBuilder::new().with_order_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let m = market(db).await;
    let product = factory::create_product(db, m.shop.id).await.unwrap();
    let line = add_to_cart(db, m.customer.id, product.id, 1).await;
    let service = OrderService::new(db, None, None, None);
    let order = service
        .create(checkout(&m, vec![line], PaymentMethod::Cod), "127.0.0.1")
        .await
        .unwrap()
        .orders
        .remove(0);
    service.confirm(order.id, m.shop.id).await.unwrap();

    assert!(service.complete(order.id, m.shop.id).await.is_err());

    DeliveryService::new(db, None, None)
        .start_self(order.id, m.shop.id)
        .await
        .unwrap();
    let done = service.complete(order.id, m.shop.id).await.unwrap();
    assert_eq!(done.status, OrderStatus::Completed);
    assert!(done.is_paid);
}
