//! Address factory for creating test delivery addresses.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test addresses with customizable fields.
///
/// Defaults place the address in central Ho Chi Minh City with coordinates set.
pub struct AddressFactory<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
    value: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_default: bool,
}

impl<'a> AddressFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, user_id: i32) -> Self {
        Self {
            db,
            user_id,
            value: "1 Nguyen Hue, District 1, Ho Chi Minh City".to_string(),
            latitude: Some(10.7743),
            longitude: Some(106.7038),
            is_default: true,
        }
    }

    /// Sets the address text.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the coordinates; `None` leaves them to be geocoded.
    pub fn coordinates(mut self, coordinates: Option<(f64, f64)>) -> Self {
        self.latitude = coordinates.map(|c| c.0);
        self.longitude = coordinates.map(|c| c.1);
        self
    }

    /// Sets whether this is the user's default address.
    pub fn is_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub async fn build(self) -> Result<entity::address::Model, DbErr> {
        entity::address::ActiveModel {
            user_id: ActiveValue::Set(self.user_id),
            name: ActiveValue::Set("Receiver".to_string()),
            phone: ActiveValue::Set("+84900000000".to_string()),
            value: ActiveValue::Set(self.value),
            latitude: ActiveValue::Set(self.latitude),
            longitude: ActiveValue::Set(self.longitude),
            is_default: ActiveValue::Set(self.is_default),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a default address with coordinates for the user.
pub async fn create_address(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<entity::address::Model, DbErr> {
    AddressFactory::new(db, user_id).build().await
}
