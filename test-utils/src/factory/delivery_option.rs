//! Self-delivery option factory.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Creates a self-delivery option for the shop.
///
/// Tariff: 5 000 per km, minimum 15 000, up to 10 km from the pickup address.
pub async fn create_delivery_option(
    db: &DatabaseConnection,
    shop_id: i32,
    pickup_address_id: i32,
) -> Result<entity::shop_delivery_option::Model, DbErr> {
    entity::shop_delivery_option::ActiveModel {
        shop_id: ActiveValue::Set(shop_id),
        fee_per_km: ActiveValue::Set(5_000),
        min_fee: ActiveValue::Set(15_000),
        max_distance_km: ActiveValue::Set(10.0),
        pickup_address_id: ActiveValue::Set(pickup_address_id),
        updated_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
}
