//! Category factory.

use crate::factory::helpers::next_id;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Creates a category with a unique generated name.
pub async fn create_category(db: &DatabaseConnection) -> Result<entity::category::Model, DbErr> {
    entity::category::ActiveModel {
        name: ActiveValue::Set(format!("Category {}", next_id())),
        ..Default::default()
    }
    .insert(db)
    .await
}
