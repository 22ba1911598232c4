use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::{
    data::discount::DiscountRepository,
    model::discount::{Discount, Voucher},
};

pub struct VoucherRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VoucherRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Saves the discount to the user's vouchers; saving twice returns the existing row.
    pub async fn save(&self, user_id: i32, discount: Discount) -> Result<Voucher, DbErr> {
        let existing = entity::prelude::Voucher::find()
            .filter(entity::voucher::Column::UserId.eq(user_id))
            .filter(entity::voucher::Column::DiscountId.eq(discount.id))
            .one(self.db)
            .await?;

        let entity = match existing {
            Some(entity) => entity,
            None => {
                entity::voucher::ActiveModel {
                    user_id: ActiveValue::Set(user_id),
                    discount_id: ActiveValue::Set(discount.id),
                    created_at: ActiveValue::Set(Utc::now()),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        Ok(Voucher {
            id: entity.id,
            discount,
            created_at: entity.created_at,
        })
    }

    /// The user's vouchers, newest first.
    pub async fn list(&self, user_id: i32) -> Result<Vec<Voucher>, DbErr> {
        let entities = entity::prelude::Voucher::find()
            .filter(entity::voucher::Column::UserId.eq(user_id))
            .order_by_desc(entity::voucher::Column::CreatedAt)
            .order_by_desc(entity::voucher::Column::Id)
            .all(self.db)
            .await?;

        let discounts = DiscountRepository::new(self.db)
            .find_by_ids(entities.iter().map(|v| v.discount_id).collect())
            .await?;

        Ok(entities
            .into_iter()
            .filter_map(|v| {
                discounts
                    .iter()
                    .find(|d| d.id == v.discount_id)
                    .cloned()
                    .map(|discount| Voucher {
                        id: v.id,
                        discount,
                        created_at: v.created_at,
                    })
            })
            .collect())
    }

    pub async fn remove(&self, id: i32, user_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Voucher::delete_many()
            .filter(entity::voucher::Column::Id.eq(id))
            .filter(entity::voucher::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
