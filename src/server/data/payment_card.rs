use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::payment::{NewPaymentCard, PaymentCard};

pub struct PaymentCardRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PaymentCardRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, card: NewPaymentCard, is_default: bool) -> Result<PaymentCard, DbErr> {
        let entity = entity::payment_card::ActiveModel {
            user_id: ActiveValue::Set(card.user_id),
            brand: ActiveValue::Set(card.brand),
            last4: ActiveValue::Set(card.last4),
            holder_name: ActiveValue::Set(card.holder_name),
            expiry_month: ActiveValue::Set(card.expiry_month),
            expiry_year: ActiveValue::Set(card.expiry_year),
            is_default: ActiveValue::Set(is_default),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(PaymentCard::from_entity(entity))
    }

    /// Finds a card owned by the user.
    pub async fn find_owned(&self, id: i32, user_id: i32) -> Result<Option<PaymentCard>, DbErr> {
        let entity = entity::prelude::PaymentCard::find_by_id(id)
            .filter(entity::payment_card::Column::UserId.eq(user_id))
            .one(self.db)
            .await?;

        Ok(entity.map(PaymentCard::from_entity))
    }

    /// The user's cards, default first then newest.
    pub async fn list(&self, user_id: i32) -> Result<Vec<PaymentCard>, DbErr> {
        let entities = entity::prelude::PaymentCard::find()
            .filter(entity::payment_card::Column::UserId.eq(user_id))
            .order_by_desc(entity::payment_card::Column::IsDefault)
            .order_by_desc(entity::payment_card::Column::CreatedAt)
            .order_by_desc(entity::payment_card::Column::Id)
            .all(self.db)
            .await?;

        Ok(entities.into_iter().map(PaymentCard::from_entity).collect())
    }

    pub async fn count(&self, user_id: i32) -> Result<u64, DbErr> {
        entity::prelude::PaymentCard::find()
            .filter(entity::payment_card::Column::UserId.eq(user_id))
            .count(self.db)
            .await
    }

    /// Makes the card the user's only default.
    pub async fn set_default(&self, id: i32, user_id: i32) -> Result<(), DbErr> {
        entity::prelude::PaymentCard::update_many()
            .col_expr(entity::payment_card::Column::IsDefault, Expr::value(false))
            .filter(entity::payment_card::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;

        entity::prelude::PaymentCard::update_many()
            .col_expr(entity::payment_card::Column::IsDefault, Expr::value(true))
            .filter(entity::payment_card::Column::Id.eq(id))
            .filter(entity::payment_card::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    pub async fn most_recent(&self, user_id: i32) -> Result<Option<PaymentCard>, DbErr> {
        let entity = entity::prelude::PaymentCard::find()
            .filter(entity::payment_card::Column::UserId.eq(user_id))
            .order_by_desc(entity::payment_card::Column::CreatedAt)
            .order_by_desc(entity::payment_card::Column::Id)
            .one(self.db)
            .await?;

        Ok(entity.map(PaymentCard::from_entity))
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::PaymentCard::delete_many()
            .filter(entity::payment_card::Column::Id.eq(id))
            .filter(entity::payment_card::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
