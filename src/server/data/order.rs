//! Order data repository.
//!
//! Orders are stored with their items and applied discounts in child tables; every
//! read reassembles them into the `Order` domain model.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;

use crate::server::model::{
    delivery::{DeliveryType, StatusLog},
    order::{DeliveryStateUpdate, NewOrder, Order, OrderStatus},
};

pub struct OrderRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OrderRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts the order with its items and discount lines.
    ///
    /// The order starts `PENDING`, unpaid, with delivery type `NONE` and an empty
    /// status log.
    pub async fn create(&self, new: NewOrder) -> Result<Order, DbErr> {
        let now = Utc::now();
        let total = (new.subtotal - new.discount_total + new.delivery_fee).max(0);

        let entity = entity::order::ActiveModel {
            tracking_id: ActiveValue::Set(new.tracking_id),
            user_id: ActiveValue::Set(new.user_id),
            shop_id: ActiveValue::Set(new.shop_id),
            address_id: ActiveValue::Set(new.address_id),
            payment_method: ActiveValue::Set(new.payment_method.as_str().to_string()),
            status: ActiveValue::Set(OrderStatus::Pending.as_str().to_string()),
            subtotal: ActiveValue::Set(new.subtotal),
            discount_total: ActiveValue::Set(new.discount_total),
            delivery_fee: ActiveValue::Set(new.delivery_fee),
            total: ActiveValue::Set(total),
            delivery_method: ActiveValue::Set(new.delivery_method.as_str().to_string()),
            delivery_type: ActiveValue::Set(DeliveryType::None.as_str().to_string()),
            delivery_status_log: ActiveValue::Set(StatusLog::default().to_json()?),
            courier_delivery_id: ActiveValue::Set(None),
            courier_tracking_url: ActiveValue::Set(None),
            note: ActiveValue::Set(new.note),
            is_paid: ActiveValue::Set(false),
            payment_id: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        let mut items = Vec::with_capacity(new.items.len());
        for item in new.items {
            let row = entity::order_item::ActiveModel {
                order_id: ActiveValue::Set(entity.id),
                product_id: ActiveValue::Set(item.product_id),
                product_name: ActiveValue::Set(item.product_name),
                price: ActiveValue::Set(item.price),
                quantity: ActiveValue::Set(item.quantity),
                ..Default::default()
            }
            .insert(self.db)
            .await?;
            items.push(row);
        }

        let mut discounts = Vec::with_capacity(new.discounts.len());
        for discount in new.discounts {
            let row = entity::order_discount::ActiveModel {
                order_id: ActiveValue::Set(entity.id),
                discount_id: ActiveValue::Set(discount.discount_id),
                amount: ActiveValue::Set(discount.amount),
                ..Default::default()
            }
            .insert(self.db)
            .await?;
            discounts.push(row);
        }

        Order::from_entity(entity, items, discounts)
    }

    /// Deletes orders together with their items and discount lines.
    pub async fn delete_many(&self, ids: Vec<i32>) -> Result<u64, DbErr> {
        if ids.is_empty() {
            return Ok(0);
        }

        entity::prelude::OrderItem::delete_many()
            .filter(entity::order_item::Column::OrderId.is_in(ids.clone()))
            .exec(self.db)
            .await?;
        entity::prelude::OrderDiscount::delete_many()
            .filter(entity::order_discount::Column::OrderId.is_in(ids.clone()))
            .exec(self.db)
            .await?;
        let result = entity::prelude::Order::delete_many()
            .filter(entity::order::Column::Id.is_in(ids))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Order>, DbErr> {
        let Some(entity) = entity::prelude::Order::find_by_id(id).one(self.db).await? else {
            return Ok(None);
        };

        Ok(self.assemble(vec![entity]).await?.pop())
    }

    pub async fn find_by_courier_delivery_id(
        &self,
        delivery_id: &str,
    ) -> Result<Option<Order>, DbErr> {
        let Some(entity) = entity::prelude::Order::find()
            .filter(entity::order::Column::CourierDeliveryId.eq(delivery_id))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        Ok(self.assemble(vec![entity]).await?.pop())
    }

    pub async fn tracking_id_exists(&self, tracking_id: &str) -> Result<bool, DbErr> {
        let count = entity::prelude::Order::find()
            .filter(entity::order::Column::TrackingId.eq(tracking_id))
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    /// A customer's orders, newest first, optionally filtered by status.
    pub async fn list_by_user(
        &self,
        user_id: i32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DbErr> {
        let mut query =
            entity::prelude::Order::find().filter(entity::order::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(entity::order::Column::Status.eq(status.as_str()));
        }

        let entities = query
            .order_by_desc(entity::order::Column::CreatedAt)
            .order_by_desc(entity::order::Column::Id)
            .all(self.db)
            .await?;

        self.assemble(entities).await
    }

    /// A shop's orders, newest first, optionally filtered by status.
    pub async fn list_by_shop(
        &self,
        shop_id: i32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DbErr> {
        let mut query =
            entity::prelude::Order::find().filter(entity::order::Column::ShopId.eq(shop_id));
        if let Some(status) = status {
            query = query.filter(entity::order::Column::Status.eq(status.as_str()));
        }

        let entities = query
            .order_by_desc(entity::order::Column::CreatedAt)
            .order_by_desc(entity::order::Column::Id)
            .all(self.db)
            .await?;

        self.assemble(entities).await
    }

    /// Orders of a shop created within `[from, to)`.
    pub async fn list_created_between(
        &self,
        shop_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Order>, DbErr> {
        let entities = entity::prelude::Order::find()
            .filter(entity::order::Column::ShopId.eq(shop_id))
            .filter(entity::order::Column::CreatedAt.gte(from))
            .filter(entity::order::Column::CreatedAt.lt(to))
            .all(self.db)
            .await?;

        self.assemble(entities).await
    }

    /// Orders linked to a payment.
    pub async fn list_by_payment(&self, payment_id: i32) -> Result<Vec<Order>, DbErr> {
        let entities = entity::prelude::Order::find()
            .filter(entity::order::Column::PaymentId.eq(payment_id))
            .order_by_asc(entity::order::Column::Id)
            .all(self.db)
            .await?;

        self.assemble(entities).await
    }

    /// IDs of orders linked to each of the given payments.
    pub async fn ids_by_payments(
        &self,
        payment_ids: Vec<i32>,
    ) -> Result<HashMap<i32, Vec<i32>>, DbErr> {
        if payment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, Option<i32>)> = entity::prelude::Order::find()
            .select_only()
            .column(entity::order::Column::Id)
            .column(entity::order::Column::PaymentId)
            .filter(entity::order::Column::PaymentId.is_in(payment_ids))
            .order_by_asc(entity::order::Column::Id)
            .into_tuple()
            .all(self.db)
            .await?;

        let mut ids: HashMap<i32, Vec<i32>> = HashMap::new();
        for (order_id, payment_id) in rows {
            if let Some(payment_id) = payment_id {
                ids.entry(payment_id).or_default().push(order_id);
            }
        }
        Ok(ids)
    }

    /// Sets the order status.
    pub async fn update_status(&self, id: i32, status: OrderStatus) -> Result<(), DbErr> {
        entity::order::ActiveModel {
            id: ActiveValue::Unchanged(id),
            status: ActiveValue::Set(status.as_str().to_string()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    /// Writes the delivery columns together with status and payment flag.
    pub async fn update_delivery_state(
        &self,
        id: i32,
        update: DeliveryStateUpdate,
    ) -> Result<(), DbErr> {
        entity::order::ActiveModel {
            id: ActiveValue::Unchanged(id),
            status: ActiveValue::Set(update.status.as_str().to_string()),
            delivery_type: ActiveValue::Set(update.delivery_type.as_str().to_string()),
            delivery_status_log: ActiveValue::Set(update.status_log.to_json()?),
            courier_delivery_id: ActiveValue::Set(update.courier_delivery_id),
            courier_tracking_url: ActiveValue::Set(update.courier_tracking_url),
            is_paid: ActiveValue::Set(update.is_paid),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    /// Links orders to a payment, optionally marking them paid.
    pub async fn attach_payment(
        &self,
        order_ids: Vec<i32>,
        payment_id: i32,
        paid: bool,
    ) -> Result<(), DbErr> {
        if order_ids.is_empty() {
            return Ok(());
        }

        let mut update = entity::prelude::Order::update_many()
            .col_expr(
                entity::order::Column::PaymentId,
                Expr::value(payment_id),
            )
            .col_expr(
                entity::order::Column::UpdatedAt,
                Expr::value(Utc::now()),
            );
        if paid {
            update = update.col_expr(
                entity::order::Column::IsPaid,
                Expr::value(true),
            );
        }

        update
            .filter(entity::order::Column::Id.is_in(order_ids))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Marks every order of the payment paid.
    pub async fn mark_paid_by_payment(&self, payment_id: i32) -> Result<u64, DbErr> {
        let result = entity::prelude::Order::update_many()
            .col_expr(
                entity::order::Column::IsPaid,
                Expr::value(true),
            )
            .col_expr(
                entity::order::Column::UpdatedAt,
                Expr::value(Utc::now()),
            )
            .filter(entity::order::Column::PaymentId.eq(payment_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Loads items and discounts for the given rows, keeping their order.
    async fn assemble(&self, entities: Vec<entity::order::Model>) -> Result<Vec<Order>, DbErr> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = entities.iter().map(|o| o.id).collect();

        let mut items: HashMap<i32, Vec<entity::order_item::Model>> = HashMap::new();
        for item in entity::prelude::OrderItem::find()
            .filter(entity::order_item::Column::OrderId.is_in(ids.clone()))
            .order_by_asc(entity::order_item::Column::Id)
            .all(self.db)
            .await?
        {
            items.entry(item.order_id).or_default().push(item);
        }

        let mut discounts: HashMap<i32, Vec<entity::order_discount::Model>> = HashMap::new();
        for discount in entity::prelude::OrderDiscount::find()
            .filter(entity::order_discount::Column::OrderId.is_in(ids))
            .order_by_asc(entity::order_discount::Column::Id)
            .all(self.db)
            .await?
        {
            discounts.entry(discount.order_id).or_default().push(discount);
        }

        entities
            .into_iter()
            .map(|o| {
                let order_items = items.remove(&o.id).unwrap_or_default();
                let order_discounts = discounts.remove(&o.id).unwrap_or_default();
                Order::from_entity(o, order_items, order_discounts)
            })
            .collect()
    }
}
