//! Payment data repository.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter,
};

use crate::server::{
    data::order::OrderRepository,
    model::{
        order::PaymentMethod,
        payment::{Payment, PaymentStatus},
    },
};

pub struct PaymentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PaymentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a payment record. `PAID` records get `paid_at` set to now.
    pub async fn create(
        &self,
        user_id: i32,
        method: PaymentMethod,
        amount: i64,
        status: PaymentStatus,
        txn_ref: String,
    ) -> Result<Payment, DbErr> {
        let now = Utc::now();
        let entity = entity::payment::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            method: ActiveValue::Set(method.as_str().to_string()),
            amount: ActiveValue::Set(amount),
            status: ActiveValue::Set(status.as_str().to_string()),
            txn_ref: ActiveValue::Set(txn_ref),
            gateway_transaction_no: ActiveValue::Set(None),
            response_code: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            paid_at: ActiveValue::Set((status == PaymentStatus::Paid).then_some(now)),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Payment::from_entity(entity, Vec::new())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Payment>, DbErr> {
        let Some(entity) = entity::prelude::Payment::find_by_id(id).one(self.db).await? else {
            return Ok(None);
        };

        self.with_orders(entity).await.map(Some)
    }

    pub async fn find_by_txn_ref(&self, txn_ref: &str) -> Result<Option<Payment>, DbErr> {
        let Some(entity) = entity::prelude::Payment::find()
            .filter(entity::payment::Column::TxnRef.eq(txn_ref))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        self.with_orders(entity).await.map(Some)
    }

    /// Records the gateway result if the payment is still pending.
    ///
    /// # Returns
    /// - `Ok(true)` - The payment moved out of `PENDING`
    /// - `Ok(false)` - It was already settled; nothing changed
    pub async fn settle(
        &self,
        id: i32,
        status: PaymentStatus,
        gateway_transaction_no: Option<String>,
        response_code: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let paid_at = (status == PaymentStatus::Paid).then_some(at);
        let result = entity::prelude::Payment::update_many()
            .col_expr(
                entity::payment::Column::Status,
                Expr::value(status.as_str()),
            )
            .col_expr(
                entity::payment::Column::GatewayTransactionNo,
                Expr::value(gateway_transaction_no),
            )
            .col_expr(
                entity::payment::Column::ResponseCode,
                Expr::value(response_code),
            )
            .col_expr(entity::payment::Column::PaidAt, Expr::value(paid_at))
            .filter(entity::payment::Column::Id.eq(id))
            .filter(entity::payment::Column::Status.eq(PaymentStatus::Pending.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Payment::delete_by_id(id)
            .exec(self.db)
            .await?;
        Ok(())
    }

    async fn with_orders(&self, entity: entity::payment::Model) -> Result<Payment, DbErr> {
        let mut ids = OrderRepository::new(self.db)
            .ids_by_payments(vec![entity.id])
            .await?;
        let order_ids = ids.remove(&entity.id).unwrap_or_default();
        Payment::from_entity(entity, order_ids)
    }
}
