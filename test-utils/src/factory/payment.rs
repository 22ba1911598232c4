//! Payment and payment card factories.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Creates a pending gateway payment for the user.
pub async fn create_pending_payment(
    db: &DatabaseConnection,
    user_id: i32,
    amount: i64,
) -> Result<entity::payment::Model, DbErr> {
    entity::payment::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        method: ActiveValue::Set("GATEWAY".to_string()),
        amount: ActiveValue::Set(amount),
        status: ActiveValue::Set("PENDING".to_string()),
        txn_ref: ActiveValue::Set(format!("TXN{:010}", next_id())),
        gateway_transaction_no: ActiveValue::Set(None),
        response_code: ActiveValue::Set(None),
        created_at: ActiveValue::Set(Utc::now()),
        paid_at: ActiveValue::Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Creates a VISA card ending in `4242`.
pub async fn create_card(
    db: &DatabaseConnection,
    user_id: i32,
    is_default: bool,
) -> Result<entity::payment_card::Model, DbErr> {
    entity::payment_card::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        brand: ActiveValue::Set("VISA".to_string()),
        last4: ActiveValue::Set("4242".to_string()),
        holder_name: ActiveValue::Set("TEST HOLDER".to_string()),
        expiry_month: ActiveValue::Set(12),
        expiry_year: ActiveValue::Set(2099),
        is_default: ActiveValue::Set(is_default),
        created_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}
