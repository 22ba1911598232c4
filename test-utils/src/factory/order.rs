//! Order factory for creating test orders with line items.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test orders with customizable fields.
///
/// Items added with [`OrderFactory::item`] are inserted as `order_item` rows and
/// their line totals make up the subtotal.
///
/// # Example
///
/// ```rust,ignore
/// let order = OrderFactory::new(&db, customer.id, shop.id, address.id)
///     .item(&product, 2)
///     .status("CONFIRMED")
///     .build()
///     .await?;
/// ```
pub struct OrderFactory<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
    shop_id: i32,
    address_id: i32,
    status: String,
    payment_method: String,
    delivery_method: String,
    delivery_type: String,
    delivery_fee: i64,
    is_paid: bool,
    courier_delivery_id: Option<String>,
    items: Vec<(i32, String, i64, i32)>,
}

impl<'a> OrderFactory<'a> {
    /// Creates a new OrderFactory with default values.
    ///
    /// Defaults:
    /// - status: `"PENDING"`
    /// - payment_method: `"COD"`
    /// - delivery_method: `"SELF"`, delivery_type: `"NONE"`
    /// - delivery_fee: `15_000`
    pub fn new(db: &'a DatabaseConnection, user_id: i32, shop_id: i32, address_id: i32) -> Self {
        Self {
            db,
            user_id,
            shop_id,
            address_id,
            status: "PENDING".to_string(),
            payment_method: "COD".to_string(),
            delivery_method: "SELF".to_string(),
            delivery_type: "NONE".to_string(),
            delivery_fee: 15_000,
            is_paid: false,
            courier_delivery_id: None,
            items: Vec::new(),
        }
    }

    /// Adds a line for `quantity` units of the product at its current price.
    pub fn item(mut self, product: &entity::product::Model, quantity: i32) -> Self {
        self.items
            .push((product.id, product.name.clone(), product.price, quantity));
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = payment_method.into();
        self
    }

    pub fn delivery_method(mut self, delivery_method: impl Into<String>) -> Self {
        self.delivery_method = delivery_method.into();
        self
    }

    pub fn delivery_type(mut self, delivery_type: impl Into<String>) -> Self {
        self.delivery_type = delivery_type.into();
        self
    }

    pub fn courier_delivery_id(mut self, id: impl Into<String>) -> Self {
        self.courier_delivery_id = Some(id.into());
        self
    }

    pub fn paid(mut self, is_paid: bool) -> Self {
        self.is_paid = is_paid;
        self
    }

    pub async fn build(self) -> Result<entity::order::Model, DbErr> {
        let now = Utc::now();
        let subtotal: i64 = self
            .items
            .iter()
            .map(|(_, _, price, quantity)| price * *quantity as i64)
            .sum();

        let order = entity::order::ActiveModel {
            tracking_id: ActiveValue::Set(format!("TEST{:08}", next_id())),
            user_id: ActiveValue::Set(self.user_id),
            shop_id: ActiveValue::Set(self.shop_id),
            address_id: ActiveValue::Set(self.address_id),
            payment_method: ActiveValue::Set(self.payment_method),
            status: ActiveValue::Set(self.status),
            subtotal: ActiveValue::Set(subtotal),
            discount_total: ActiveValue::Set(0),
            delivery_fee: ActiveValue::Set(self.delivery_fee),
            total: ActiveValue::Set(subtotal + self.delivery_fee),
            delivery_method: ActiveValue::Set(self.delivery_method),
            delivery_type: ActiveValue::Set(self.delivery_type),
            delivery_status_log: ActiveValue::Set("[]".to_string()),
            courier_delivery_id: ActiveValue::Set(self.courier_delivery_id),
            courier_tracking_url: ActiveValue::Set(None),
            note: ActiveValue::Set(None),
            is_paid: ActiveValue::Set(self.is_paid),
            payment_id: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        for (product_id, product_name, price, quantity) in self.items {
            entity::order_item::ActiveModel {
                order_id: ActiveValue::Set(order.id),
                product_id: ActiveValue::Set(product_id),
                product_name: ActiveValue::Set(product_name),
                price: ActiveValue::Set(price),
                quantity: ActiveValue::Set(quantity),
                ..Default::default()
            }
            .insert(self.db)
            .await?;
        }

        Ok(order)
    }
}

/// Creates a pending COD order without items.
pub async fn create_order(
    db: &DatabaseConnection,
    user_id: i32,
    shop_id: i32,
    address_id: i32,
) -> Result<entity::order::Model, DbErr> {
    OrderFactory::new(db, user_id, shop_id, address_id)
        .build()
        .await
}
