//! Delivery orchestration.
//!
//! An order is dispatched either by the shop itself (`SELF`) or through the
//! courier (`GRAB`). Each transition appends to the order's status log via
//! [`StatusLog::apply`](crate::server::model::delivery::StatusLog::apply) and moves
//! the order with [`DeliveryStateUpdate::follow`]. Every operation here is a single
//! sequential request; nothing is queued or retried.

pub mod courier;
pub mod fee;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{
        address::AddressRepository, delivery_option::DeliveryOptionRepository,
        order::OrderRepository,
    },
    error::{delivery::DeliveryError, AppError},
    model::{
        address::Address,
        delivery::{
            DeliveryMethod, DeliveryOption, DeliveryQuote, DeliveryStatus, DeliveryType,
            UpsertDeliveryOptionParams,
        },
        order::{DeliveryStateUpdate, Order, OrderStatus, PaymentMethod},
    },
    service::{
        delivery::courier::{CourierApi, CourierPackage, CourierRequest, CourierStop},
        geocoding::Geocoder,
        notification::NotificationService,
    },
    util::geo::Coordinates,
};

/// Statuses a shop may report for its own deliveries.
pub const SELF_DELIVERY_STATUSES: [DeliveryStatus; 4] = [
    DeliveryStatus::InDelivery,
    DeliveryStatus::Completed,
    DeliveryStatus::Failed,
    DeliveryStatus::Returned,
];

pub struct DeliveryService<'a> {
    db: &'a DatabaseConnection,
    geocoder: Option<&'a dyn Geocoder>,
    courier: Option<&'a dyn CourierApi>,
}

impl<'a> DeliveryService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        geocoder: Option<&'a dyn Geocoder>,
        courier: Option<&'a dyn CourierApi>,
    ) -> Self {
        Self {
            db,
            geocoder,
            courier,
        }
    }

    pub async fn get_option(&self, shop_id: i32) -> Result<DeliveryOption, AppError> {
        DeliveryOptionRepository::new(self.db)
            .get(shop_id)
            .await?
            .ok_or_else(|| DeliveryError::SelfDeliveryUnavailable(shop_id).into())
    }

    /// Creates or replaces the shop's self-delivery tariff.
    ///
    /// The pickup address must belong to the shop and be locatable.
    pub async fn upsert_option(&self, params: UpsertDeliveryOptionParams) -> Result<DeliveryOption, AppError> {
        if params.fee_per_km < 0 || params.min_fee < 0 {
            return Err(AppError::BadRequest("Fees cannot be negative".to_string()));
        }
        if !(params.max_distance_km > 0.0) {
            return Err(AppError::BadRequest(
                "Maximum distance must be greater than 0".to_string(),
            ));
        }

        let pickup = AddressRepository::new(self.db)
            .find_by_id(params.pickup_address_id)
            .await?
            .filter(|a| a.user_id == params.shop_id)
            .ok_or_else(|| AppError::BadRequest("Pickup address not found".to_string()))?;
        self.locate(&pickup).await?;

        Ok(DeliveryOptionRepository::new(self.db).upsert(params).await?)
    }

    /// Coordinates of an address, geocoding and storing them when missing.
    ///
    /// # Returns
    /// - `Err(DeliveryError::AddressNotLocated)` - No coordinates and none could be resolved
    pub async fn locate(&self, address: &Address) -> Result<Coordinates, AppError> {
        if let Some(coordinates) = address.coordinates {
            return Ok(coordinates);
        }

        let resolved = match self.geocoder {
            Some(geocoder) => geocoder.geocode(&address.value).await?,
            None => None,
        };

        let coordinates =
            resolved.ok_or_else(|| DeliveryError::AddressNotLocated(address.value.clone()))?;
        AddressRepository::new(self.db)
            .set_coordinates(address.id, coordinates)
            .await?;

        Ok(coordinates)
    }

    /// The shop's pickup point: the address named in its tariff, else its default address.
    pub async fn pickup_address(&self, shop_id: i32) -> Result<Address, AppError> {
        let addresses = AddressRepository::new(self.db);

        if let Some(option) = DeliveryOptionRepository::new(self.db).get(shop_id).await? {
            if let Some(address) = addresses.find_by_id(option.pickup_address_id).await? {
                return Ok(address);
            }
        }

        addresses
            .list_by_user(shop_id)
            .await?
            .into_iter()
            .find(|a| a.is_default)
            .ok_or_else(|| {
                AppError::BadRequest(format!("Shop {} has no pickup address", shop_id))
            })
    }

    pub async fn quote_self(&self, shop_id: i32, dropoff: &Address) -> Result<DeliveryQuote, AppError> {
        let option = self.get_option(shop_id).await?;

        let pickup = AddressRepository::new(self.db)
            .find_by_id(option.pickup_address_id)
            .await?
            .ok_or_else(|| DeliveryError::SelfDeliveryUnavailable(shop_id))?;

        let from = self.locate(&pickup).await?;
        let to = self.locate(dropoff).await?;

        Ok(fee::self_delivery_fee(&option, from, to)?)
    }

    pub async fn quote_courier(
        &self,
        shop_id: i32,
        dropoff: &Address,
        packages: Vec<CourierPackage>,
    ) -> Result<DeliveryQuote, AppError> {
        let courier = self.courier.ok_or(DeliveryError::CourierUnavailable)?;
        let request = self
            .courier_request(shop_id, String::new(), dropoff, packages, None)
            .await?;

        let fee = courier.quote(&request).await?;

        Ok(DeliveryQuote {
            method: DeliveryMethod::Grab,
            fee,
            distance_km: None,
        })
    }

    /// Quote for one method.
    pub async fn quote(
        &self,
        method: DeliveryMethod,
        shop_id: i32,
        dropoff: &Address,
        packages: Vec<CourierPackage>,
    ) -> Result<DeliveryQuote, AppError> {
        match method {
            DeliveryMethod::SelfDelivery => self.quote_self(shop_id, dropoff).await,
            DeliveryMethod::Grab => self.quote_courier(shop_id, dropoff, packages).await,
        }
    }

    /// Every quote currently available for a shop group.
    ///
    /// Methods that cannot serve the address are left out rather than failing
    /// the whole quote.
    pub async fn available_quotes(
        &self,
        shop_id: i32,
        dropoff: &Address,
        packages: Vec<CourierPackage>,
    ) -> Result<Vec<DeliveryQuote>, AppError> {
        let mut quotes = Vec::new();

        match self.quote_self(shop_id, dropoff).await {
            Ok(quote) => quotes.push(quote),
            Err(AppError::DeliveryErr(e)) => {
                tracing::debug!("Self-delivery unavailable for shop {}: {}", shop_id, e)
            }
            Err(e) => return Err(e),
        }

        if self.courier.is_some() {
            match self.quote_courier(shop_id, dropoff, packages).await {
                Ok(quote) => quotes.push(quote),
                Err(e) => tracing::warn!("Courier quote failed for shop {}: {}", shop_id, e),
            }
        }

        Ok(quotes)
    }

    /// Starts a shop-operated delivery.
    ///
    /// # Returns
    /// - `Err(DeliveryError::InvalidState)` - Order not `CONFIRMED` or already dispatched
    pub async fn start_self(&self, order_id: i32, shop_id: i32) -> Result<Order, AppError> {
        let order = self.load_for_shop(order_id, shop_id).await?;
        ensure_dispatchable(&order)?;

        let mut update = DeliveryStateUpdate::from_order(&order);
        update.begin_dispatch(DeliveryType::SelfDelivery);
        update.status_log.apply(DeliveryStatus::InDelivery, Utc::now());
        update.follow(DeliveryStatus::InDelivery);

        let order = self.save(&order, update).await?;
        tracing::info!("Order {} out for self-delivery", order.id);

        Ok(order)
    }

    /// Records a status reported by the shop for its own delivery.
    pub async fn update_self(
        &self,
        order_id: i32,
        shop_id: i32,
        status: DeliveryStatus,
    ) -> Result<Order, AppError> {
        if !SELF_DELIVERY_STATUSES.contains(&status) {
            return Err(AppError::BadRequest(format!(
                "Status {} cannot be set for self-delivery",
                status.as_str()
            )));
        }

        let order = self.load_for_shop(order_id, shop_id).await?;
        if order.delivery_type != DeliveryType::SelfDelivery || order.status != OrderStatus::Delivery {
            return Err(DeliveryError::InvalidState(format!(
                "Order {} is not being self-delivered",
                order.tracking_id
            ))
            .into());
        }

        let mut update = DeliveryStateUpdate::from_order(&order);
        update.status_log.apply(status, Utc::now());
        update.follow(status);

        let order = self.save(&order, update).await?;
        tracing::info!("Self-delivery of order {} is now {}", order.id, status.as_str());

        Ok(order)
    }

    /// Books the courier for a confirmed order.
    pub async fn book_courier(&self, order_id: i32, shop_id: i32) -> Result<Order, AppError> {
        let courier = self.courier.ok_or(DeliveryError::CourierUnavailable)?;
        let order = self.load_for_shop(order_id, shop_id).await?;
        ensure_dispatchable(&order)?;

        let dropoff = AddressRepository::new(self.db)
            .find_by_id(order.address_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Delivery address not found".to_string()))?;

        let packages = order
            .items
            .iter()
            .map(|i| CourierPackage {
                name: i.product_name.clone(),
                quantity: i.quantity,
                price: i.price,
            })
            .collect();
        let cash = (order.payment_method == PaymentMethod::Cod && !order.is_paid).then_some(order.total);

        let request = self
            .courier_request(order.shop_id, order.tracking_id.clone(), &dropoff, packages, cash)
            .await?;
        let delivery = courier.create(&request).await?;

        let mut update = DeliveryStateUpdate::from_order(&order);
        update.begin_dispatch(DeliveryType::Grab);
        update.courier_delivery_id = Some(delivery.delivery_id.clone());
        update.courier_tracking_url = delivery.tracking_url;
        update.status_log.apply(delivery.status, Utc::now());
        update.follow(delivery.status);

        let order = self.save(&order, update).await?;
        tracing::info!(
            "Booked courier delivery {} for order {}",
            delivery.delivery_id,
            order.id
        );

        Ok(order)
    }

    /// Polls the courier and reconciles the order with its answer.
    pub async fn refresh_courier(&self, order_id: i32, shop_id: i32) -> Result<Order, AppError> {
        let courier = self.courier.ok_or(DeliveryError::CourierUnavailable)?;
        let order = self.load_for_shop(order_id, shop_id).await?;
        let delivery_id = courier_delivery_id(&order)?;

        let delivery = courier.get(&delivery_id).await?;
        self.reconcile(order, delivery.status, delivery.tracking_url, Utc::now())
            .await
    }

    /// Applies a status pushed by the courier.
    ///
    /// # Returns
    /// - `Err(AppError::NotFound)` - No order carries this courier delivery ID
    pub async fn courier_webhook(
        &self,
        delivery_id: &str,
        status: DeliveryStatus,
        tracking_url: Option<String>,
    ) -> Result<Order, AppError> {
        let order = OrderRepository::new(self.db)
            .find_by_courier_delivery_id(delivery_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Unknown delivery {}", delivery_id)))?;

        self.reconcile(order, status, tracking_url, Utc::now()).await
    }

    /// Cancels the courier booking and returns the order to `CONFIRMED`.
    pub async fn cancel_courier(&self, order_id: i32, shop_id: i32) -> Result<Order, AppError> {
        let order = self.load_for_shop(order_id, shop_id).await?;
        self.cancel_booking(order).await
    }

    /// Cancels the courier booking of an order already loaded by the caller.
    pub async fn cancel_booking(&self, order: Order) -> Result<Order, AppError> {
        let courier = self.courier.ok_or(DeliveryError::CourierUnavailable)?;
        let delivery_id = courier_delivery_id(&order)?;

        courier.cancel(&delivery_id).await?;
        tracing::info!("Cancelled courier delivery {} for order {}", delivery_id, order.id);

        self.reconcile(order, DeliveryStatus::Canceled, None, Utc::now())
            .await
    }

    /// Delivery state of an order, visible to its customer and its shop.
    pub async fn get_delivery(&self, order_id: i32, user_id: i32) -> Result<Order, AppError> {
        OrderRepository::new(self.db)
            .find_by_id(order_id)
            .await?
            .filter(|o| o.user_id == user_id || o.shop_id == user_id)
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    /// Reconciles a courier status into a courier-dispatched order.
    ///
    /// Orders no longer dispatched through the courier are returned unchanged.
    async fn reconcile(
        &self,
        order: Order,
        status: DeliveryStatus,
        tracking_url: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Order, AppError> {
        if order.delivery_type != DeliveryType::Grab {
            tracing::debug!(
                "Ignoring courier status {} for order {} with delivery type {}",
                status.as_str(),
                order.id,
                order.delivery_type.as_str()
            );
            return Ok(order);
        }

        let mut update = DeliveryStateUpdate::from_order(&order);
        let changed = update.status_log.apply(status, at);
        if tracking_url.is_some() {
            update.courier_tracking_url = tracking_url;
        }
        update.follow(status);

        if !changed && update.courier_tracking_url == order.courier_tracking_url && update.status == order.status {
            return Ok(order);
        }

        self.save(&order, update).await
    }

    /// Persists the update, reloads the order and notifies the customer of status changes.
    async fn save(&self, before: &Order, update: DeliveryStateUpdate) -> Result<Order, AppError> {
        let repo = OrderRepository::new(self.db);
        repo.update_delivery_state(before.id, update).await?;

        let order = repo
            .find_by_id(before.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if order.status != before.status {
            let message = match order.status {
                OrderStatus::Delivery => "Your order is on its way",
                OrderStatus::Completed => "Your order has been delivered",
                OrderStatus::Returned => "Your order was returned to the shop",
                OrderStatus::Confirmed => "Delivery was interrupted, the shop will dispatch your order again",
                _ => "Your order was updated",
            };
            NotificationService::new(self.db)
                .order_event(&order, order.user_id, message)
                .await;
        }

        Ok(order)
    }

    async fn load_for_shop(&self, order_id: i32, shop_id: i32) -> Result<Order, AppError> {
        OrderRepository::new(self.db)
            .find_by_id(order_id)
            .await?
            .filter(|o| o.shop_id == shop_id)
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    async fn courier_request(
        &self,
        shop_id: i32,
        merchant_order_id: String,
        dropoff: &Address,
        packages: Vec<CourierPackage>,
        cash_on_delivery: Option<i64>,
    ) -> Result<CourierRequest, AppError> {
        let pickup = self.pickup_address(shop_id).await?;
        let origin = self.locate(&pickup).await?;
        let destination = self.locate(dropoff).await?;

        Ok(CourierRequest {
            merchant_order_id,
            origin: CourierStop {
                name: pickup.name,
                phone: pickup.phone,
                address: pickup.value,
                coordinates: Some(origin),
            },
            destination: CourierStop {
                name: dropoff.name.clone(),
                phone: dropoff.phone.clone(),
                address: dropoff.value.clone(),
                coordinates: Some(destination),
            },
            packages,
            cash_on_delivery,
        })
    }
}

fn ensure_dispatchable(order: &Order) -> Result<(), DeliveryError> {
    if order.status != OrderStatus::Confirmed || order.delivery_type != DeliveryType::None {
        return Err(DeliveryError::InvalidState(format!(
            "Order {} must be confirmed and not yet dispatched",
            order.tracking_id
        )));
    }
    Ok(())
}

fn courier_delivery_id(order: &Order) -> Result<String, DeliveryError> {
    match (&order.delivery_type, &order.courier_delivery_id) {
        (DeliveryType::Grab, Some(id)) => Ok(id.clone()),
        _ => Err(DeliveryError::InvalidState(format!(
            "Order {} has no active courier delivery",
            order.tracking_id
        ))),
    }
}
