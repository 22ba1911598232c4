use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait};

use crate::server::model::delivery::{DeliveryOption, UpsertDeliveryOptionParams};

pub struct DeliveryOptionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DeliveryOptionRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, shop_id: i32) -> Result<Option<DeliveryOption>, DbErr> {
        let entity = entity::prelude::ShopDeliveryOption::find_by_id(shop_id)
            .one(self.db)
            .await?;

        Ok(entity.map(DeliveryOption::from_entity))
    }

    /// Creates or replaces the shop's self-delivery tariff.
    pub async fn upsert(&self, params: UpsertDeliveryOptionParams) -> Result<DeliveryOption, DbErr> {
        let existing = entity::prelude::ShopDeliveryOption::find_by_id(params.shop_id)
            .one(self.db)
            .await?;

        let active = entity::shop_delivery_option::ActiveModel {
            shop_id: ActiveValue::Set(params.shop_id),
            fee_per_km: ActiveValue::Set(params.fee_per_km),
            min_fee: ActiveValue::Set(params.min_fee),
            max_distance_km: ActiveValue::Set(params.max_distance_km),
            pickup_address_id: ActiveValue::Set(params.pickup_address_id),
            updated_at: ActiveValue::Set(Utc::now()),
        };

        let entity = match existing {
            Some(_) => active.update(self.db).await?,
            None => active.insert(self.db).await?,
        };

        Ok(DeliveryOption::from_entity(entity))
    }
}
