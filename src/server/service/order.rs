//! Checkout and the order lifecycle.
//!
//! A checkout is split into one order per shop. Stock and discount usage are
//! reserved with conditional updates; when a later step fails, the orders
//! already inserted are removed and the reservations given back before the
//! error is returned. The cart is cleared only once the checkout has succeeded.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::server::{
    config::PaymentGatewayConfig,
    data::{
        address::AddressRepository, cart::CartRepository, discount::DiscountRepository,
        order::OrderRepository, product::ProductRepository,
    },
    error::{payment::PaymentError, AppError},
    model::{
        address::Address,
        cart::{CartLine, CartShop},
        delivery::{DeliveryStatus, DeliveryType},
        discount::{Discount, DiscountLine},
        order::{
            CreateOrderParams, NewOrder, Order, OrderDiscount, OrderItem, OrderStatus,
            PaymentMethod, ShopQuote,
        },
    },
    service::{
        cart::CartService,
        delivery::{
            courier::{CourierApi, CourierPackage},
            DeliveryService,
        },
        geocoding::Geocoder,
        notification::NotificationService,
        payment::{card::CardService, PaymentService},
    },
    util::token::generate_tracking_id,
};

/// Attempts at drawing an unused tracking id before giving up.
const TRACKING_ID_ATTEMPTS: usize = 5;

/// Result of a checkout.
#[derive(Debug)]
pub struct Checkout {
    pub orders: Vec<Order>,
    /// Hosted payment page for `GATEWAY` checkouts.
    pub payment_url: Option<String>,
}

pub struct OrderService<'a> {
    db: &'a DatabaseConnection,
    geocoder: Option<&'a dyn Geocoder>,
    courier: Option<&'a dyn CourierApi>,
    gateway: Option<&'a PaymentGatewayConfig>,
}

impl<'a> OrderService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        geocoder: Option<&'a dyn Geocoder>,
        courier: Option<&'a dyn CourierApi>,
        gateway: Option<&'a PaymentGatewayConfig>,
    ) -> Self {
        Self {
            db,
            geocoder,
            courier,
            gateway,
        }
    }

    fn delivery(&self) -> DeliveryService<'a> {
        DeliveryService::new(self.db, self.geocoder, self.courier)
    }

    /// Delivery prices for each shop group of the selected cart lines.
    pub async fn quote(
        &self,
        user_id: i32,
        cart_item_ids: Vec<i32>,
        address_id: i32,
    ) -> Result<Vec<ShopQuote>, AppError> {
        let address = self.owned_address(address_id, user_id).await?;
        let shops = self.selected_shops(user_id, cart_item_ids).await?;

        let delivery = self.delivery();
        let mut quotes = Vec::with_capacity(shops.len());
        for shop in shops {
            let delivery_options = delivery
                .available_quotes(shop.shop_id, &address, packages(&shop.items))
                .await?;
            quotes.push(ShopQuote {
                shop_id: shop.shop_id,
                subtotal: shop.subtotal(),
                delivery_options,
            });
        }

        Ok(quotes)
    }

    /// Places one order per shop for the selected cart lines.
    ///
    /// # Arguments
    /// - `params` - Checkout selection
    /// - `client_ip` - Payer's address, forwarded to the payment gateway
    ///
    /// # Returns
    /// - `Ok(Checkout)` - Created orders and, for `GATEWAY`, the payment URL
    /// - `Err(AppError::Conflict)` - Stock or discount ran out during checkout
    pub async fn create(&self, params: CreateOrderParams, client_ip: &str) -> Result<Checkout, AppError> {
        let user_id = params.user_id;
        let address = self.owned_address(params.address_id, user_id).await?;

        match params.payment_method {
            PaymentMethod::Card => {
                let card_id = params.card_id.ok_or_else(|| {
                    AppError::BadRequest("A card is required for card payment".to_string())
                })?;
                CardService::new(self.db).find_owned(card_id, user_id).await?;
            }
            PaymentMethod::Gateway if self.gateway.is_none() => {
                return Err(PaymentError::GatewayUnavailable.into());
            }
            _ => {}
        }

        let cart_item_ids = params.cart_item_ids.clone();
        let shops = self.selected_shops(user_id, params.cart_item_ids).await?;
        for line in shops.iter().flat_map(|s| &s.items) {
            if line.quantity > line.stock {
                return Err(AppError::Conflict(format!(
                    "Only {} of {} left in stock",
                    line.stock, line.product_name
                )));
            }
        }

        let discounts = self.selected_discounts(params.discount_ids, &shops).await?;

        let delivery = self.delivery();
        let discount_repo = DiscountRepository::new(self.db);
        let now = Utc::now();
        let mut drafts = Vec::with_capacity(shops.len());
        for shop in &shops {
            let quote = delivery
                .quote(params.delivery_method, shop.shop_id, &address, packages(&shop.items))
                .await?;

            let lines: Vec<DiscountLine> = shop
                .items
                .iter()
                .map(|l| DiscountLine {
                    product_id: l.product_id,
                    line_total: l.line_total(),
                })
                .collect();

            let subtotal = shop.subtotal();
            let mut applied = Vec::new();
            let mut discount_total = 0;
            for discount in discounts.iter().filter(|d| d.shop_id == shop.shop_id) {
                let usage = discount_repo.user_usage(discount.id, user_id).await?;
                let amount = discount
                    .evaluate(usage, &lines, now)
                    .map_err(AppError::BadRequest)?
                    .min(subtotal - discount_total);
                discount_total += amount;
                applied.push(OrderDiscount {
                    discount_id: discount.id,
                    amount,
                });
            }

            drafts.push(NewOrder {
                tracking_id: String::new(),
                user_id,
                shop_id: shop.shop_id,
                address_id: address.id,
                payment_method: params.payment_method,
                items: shop
                    .items
                    .iter()
                    .map(|l| OrderItem {
                        product_id: l.product_id,
                        product_name: l.product_name.clone(),
                        price: l.price,
                        quantity: l.quantity,
                    })
                    .collect(),
                discounts: applied,
                subtotal,
                discount_total,
                delivery_fee: quote.fee,
                delivery_method: params.delivery_method,
                note: params.note.clone(),
            });
        }

        let items: Vec<OrderItem> = drafts.iter().flat_map(|d| d.items.clone()).collect();
        self.reserve_stock(&items).await?;

        let redemptions: Vec<i32> = drafts
            .iter()
            .flat_map(|d| d.discounts.iter().map(|od| od.discount_id))
            .collect();
        if let Err(e) = self.redeem_discounts(&redemptions, user_id).await {
            self.restore_stock(&items).await;
            return Err(e);
        }

        let mut orders = Vec::with_capacity(drafts.len());
        let placed = self
            .place_orders(drafts, params.payment_method, user_id, client_ip, &mut orders)
            .await;
        let payment_url = match placed {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Checkout for user {} failed, undoing reservations: {}", user_id, e);
                self.unwind_checkout(&items, &redemptions, user_id, &orders)
                    .await;
                return Err(e);
            }
        };

        if let Err(e) = CartRepository::new(self.db)
            .delete_many(user_id, cart_item_ids)
            .await
        {
            tracing::error!("Failed to clear ordered cart lines of user {}: {}", user_id, e);
        }

        let notifications = NotificationService::new(self.db);
        for order in &orders {
            tracing::info!(
                "User {} placed order {} with shop {}",
                user_id,
                order.tracking_id,
                order.shop_id
            );
            notifications
                .order_event(order, order.shop_id, "You have a new order")
                .await;
        }

        Ok(Checkout {
            orders,
            payment_url,
        })
    }

    /// Inserts the orders and records their payment.
    ///
    /// Orders are pushed to `orders` as soon as they exist so a failing caller
    /// knows what to remove.
    async fn place_orders(
        &self,
        drafts: Vec<NewOrder>,
        payment_method: PaymentMethod,
        user_id: i32,
        client_ip: &str,
        orders: &mut Vec<Order>,
    ) -> Result<Option<String>, AppError> {
        let order_repo = OrderRepository::new(self.db);
        for mut draft in drafts {
            draft.tracking_id = self.unused_tracking_id().await?;
            orders.push(order_repo.create(draft).await?);
        }

        let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
        let amount: i64 = orders.iter().map(|o| o.total).sum();
        let payments = PaymentService::new(self.db, self.gateway);
        match payment_method {
            PaymentMethod::Cod => Ok(None),
            PaymentMethod::Card => {
                let payment = payments.record_card_payment(user_id, amount, order_ids).await?;
                for order in orders.iter_mut() {
                    order.is_paid = true;
                    order.payment_id = Some(payment.id);
                }
                Ok(None)
            }
            PaymentMethod::Gateway => {
                let (payment, url) = payments
                    .start_gateway_payment(user_id, amount, order_ids, client_ip)
                    .await?;
                for order in orders.iter_mut() {
                    order.payment_id = Some(payment.id);
                }
                Ok(Some(url))
            }
        }
    }

    /// Removes the orders of a failed checkout and gives back what it reserved.
    async fn unwind_checkout(
        &self,
        items: &[OrderItem],
        redemptions: &[i32],
        user_id: i32,
        orders: &[Order],
    ) {
        let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
        if let Err(e) = OrderRepository::new(self.db).delete_many(order_ids).await {
            tracing::error!("Failed to remove orders of a failed checkout: {}", e);
        }

        self.restore_stock(items).await;
        self.release_discounts(redemptions, user_id).await;
    }

    pub async fn list_mine(
        &self,
        user_id: i32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, AppError> {
        Ok(OrderRepository::new(self.db)
            .list_by_user(user_id, status)
            .await?)
    }

    pub async fn list_for_shop(
        &self,
        shop_id: i32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, AppError> {
        Ok(OrderRepository::new(self.db)
            .list_by_shop(shop_id, status)
            .await?)
    }

    /// An order visible to its customer or its shop.
    pub async fn get(&self, id: i32, user_id: i32) -> Result<Order, AppError> {
        OrderRepository::new(self.db)
            .find_by_id(id)
            .await?
            .filter(|o| o.user_id == user_id || o.shop_id == user_id)
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    /// Shop accepts a pending order. Gateway orders must be paid first.
    pub async fn confirm(&self, id: i32, shop_id: i32) -> Result<Order, AppError> {
        let order = self.get(id, shop_id).await?;
        if order.shop_id != shop_id {
            return Err(AppError::NotFound("Order not found".to_string()));
        }
        if order.status != OrderStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Order {} is {} and cannot be confirmed",
                order.tracking_id,
                order.status.as_str()
            )));
        }
        if order.payment_method == PaymentMethod::Gateway && !order.is_paid {
            return Err(AppError::Conflict(format!(
                "Order {} is awaiting online payment",
                order.tracking_id
            )));
        }

        let customer = order.user_id;
        self.transition(order, OrderStatus::Confirmed, customer, "Your order was confirmed by the shop")
            .await
    }

    /// Cancels an order, giving back its stock and discount usage.
    ///
    /// The customer may cancel while `PENDING`. The shop may cancel while
    /// `PENDING` or `CONFIRMED`, and while the courier still holds the order;
    /// that booking is cancelled first. A self-delivery in progress has to be
    /// reported as failed before the order can be cancelled.
    pub async fn cancel(&self, id: i32, user_id: i32) -> Result<Order, AppError> {
        let mut order = self.get(id, user_id).await?;

        let with_courier = order.status == OrderStatus::Delivery
            && order.delivery_type == DeliveryType::Grab
            && order.courier_delivery_id.is_some();
        let allowed = if order.shop_id == user_id {
            matches!(order.status, OrderStatus::Pending | OrderStatus::Confirmed) || with_courier
        } else {
            order.status == OrderStatus::Pending
        };
        if !allowed {
            return Err(AppError::Conflict(format!(
                "Order {} is {} and can no longer be cancelled",
                order.tracking_id,
                order.status.as_str()
            )));
        }

        if with_courier {
            order = self.delivery().cancel_booking(order).await?;
        }

        self.restore_stock(&order.items).await;
        let discounts = DiscountRepository::new(self.db);
        for discount in &order.discounts {
            discounts.release(discount.discount_id, order.user_id).await?;
        }
        if order.is_paid {
            tracing::warn!(
                "Paid order {} was cancelled; payment {:?} needs a manual refund",
                order.tracking_id,
                order.payment_id
            );
        }

        let (recipient, message) = if order.shop_id == user_id {
            (order.user_id, "Your order was cancelled by the shop")
        } else {
            (order.shop_id, "The customer cancelled the order")
        };
        self.transition(order, OrderStatus::Cancelled, recipient, message)
            .await
    }

    /// Shop marks a self-delivered order as handed over.
    pub async fn complete(&self, id: i32, shop_id: i32) -> Result<Order, AppError> {
        self.delivery()
            .update_self(id, shop_id, DeliveryStatus::Completed)
            .await
    }

    /// Persists a status change and notifies the other party.
    async fn transition(
        &self,
        order: Order,
        status: OrderStatus,
        recipient_id: i32,
        message: &str,
    ) -> Result<Order, AppError> {
        let repo = OrderRepository::new(self.db);
        repo.update_status(order.id, status).await?;
        tracing::info!(
            "Order {} moved from {} to {}",
            order.tracking_id,
            order.status.as_str(),
            status.as_str()
        );

        let order = repo
            .find_by_id(order.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        NotificationService::new(self.db)
            .order_event(&order, recipient_id, message)
            .await;

        Ok(order)
    }

    async fn owned_address(&self, id: i32, user_id: i32) -> Result<Address, AppError> {
        AddressRepository::new(self.db)
            .find_by_id(id)
            .await?
            .filter(|a| a.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Address not found".to_string()))
    }

    /// The selected cart lines grouped by shop.
    ///
    /// # Returns
    /// - `Err(AppError::BadRequest)` - Nothing selected
    /// - `Err(AppError::NotFound)` - A selected line is not in the user's cart
    async fn selected_shops(&self, user_id: i32, ids: Vec<i32>) -> Result<Vec<CartShop>, AppError> {
        let unique: HashSet<i32> = ids.iter().copied().collect();
        if unique.is_empty() {
            return Err(AppError::BadRequest("No cart items selected".to_string()));
        }

        let lines = CartRepository::new(self.db)
            .list_lines(user_id, Some(unique.iter().copied().collect()))
            .await?;
        if lines.len() != unique.len() {
            return Err(AppError::NotFound("Cart item not found".to_string()));
        }

        Ok(CartService::new(self.db).group(lines).await?.shops)
    }

    /// Loads the chosen discounts; each must belong to a shop in the checkout.
    async fn selected_discounts(
        &self,
        ids: Vec<i32>,
        shops: &[CartShop],
    ) -> Result<Vec<Discount>, AppError> {
        let unique: HashSet<i32> = ids.into_iter().collect();
        let discounts = DiscountRepository::new(self.db)
            .find_by_ids(unique.iter().copied().collect())
            .await?;
        if discounts.len() != unique.len() {
            return Err(AppError::NotFound("Discount not found".to_string()));
        }

        if let Some(foreign) = discounts
            .iter()
            .find(|d| !shops.iter().any(|s| s.shop_id == d.shop_id))
        {
            return Err(AppError::BadRequest(format!(
                "Discount {} does not apply to any shop in this order",
                foreign.code
            )));
        }

        Ok(discounts)
    }

    /// Decrements stock for every item, undoing earlier decrements on shortage.
    async fn reserve_stock(&self, items: &[OrderItem]) -> Result<(), AppError> {
        let products = ProductRepository::new(self.db);
        for (index, item) in items.iter().enumerate() {
            let reserved = match products.decrement_stock(item.product_id, item.quantity).await {
                Ok(reserved) => reserved,
                Err(e) => {
                    self.restore_stock(&items[..index]).await;
                    return Err(e.into());
                }
            };
            if !reserved {
                self.restore_stock(&items[..index]).await;
                return Err(AppError::Conflict(format!(
                    "Not enough stock for {}",
                    item.product_name
                )));
            }
        }
        Ok(())
    }

    /// Gives stock back. Failures are logged; the caller is already unwinding
    /// or cancelling.
    async fn restore_stock(&self, items: &[OrderItem]) {
        let products = ProductRepository::new(self.db);
        for item in items {
            if let Err(e) = products.increment_stock(item.product_id, item.quantity).await {
                tracing::error!(
                    "Failed to restore {} units of product {}: {}",
                    item.quantity,
                    item.product_id,
                    e
                );
            }
        }
    }

    async fn redeem_discounts(&self, discount_ids: &[i32], user_id: i32) -> Result<(), AppError> {
        let repo = DiscountRepository::new(self.db);
        for (index, discount_id) in discount_ids.iter().enumerate() {
            let redeemed = match repo.redeem(*discount_id, user_id).await {
                Ok(redeemed) => redeemed,
                Err(e) => {
                    self.release_discounts(&discount_ids[..index], user_id).await;
                    return Err(e.into());
                }
            };
            if !redeemed {
                self.release_discounts(&discount_ids[..index], user_id).await;
                return Err(AppError::Conflict(format!(
                    "Discount {} has been fully redeemed",
                    discount_id
                )));
            }
        }
        Ok(())
    }

    /// Gives discount uses back. Failures are logged like `restore_stock`.
    async fn release_discounts(&self, discount_ids: &[i32], user_id: i32) {
        let repo = DiscountRepository::new(self.db);
        for discount_id in discount_ids {
            if let Err(e) = repo.release(*discount_id, user_id).await {
                tracing::error!(
                    "Failed to release discount {} for user {}: {}",
                    discount_id,
                    user_id,
                    e
                );
            }
        }
    }

    async fn unused_tracking_id(&self) -> Result<String, AppError> {
        let repo = OrderRepository::new(self.db);
        for _ in 0..TRACKING_ID_ATTEMPTS {
            let candidate = generate_tracking_id();
            if !repo.tracking_id_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::InternalError(
            "Could not allocate a unique tracking id".to_string(),
        ))
    }
}

fn packages(lines: &[CartLine]) -> Vec<CourierPackage> {
    lines
        .iter()
        .map(|l| CourierPackage {
            name: l.product_name.clone(),
            quantity: l.quantity,
            price: l.price,
        })
        .collect()
}

#[cfg(test)]
mod tests;
