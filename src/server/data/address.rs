//! Address data repository.
//!
//! Maintains the invariant that each user with addresses has exactly one default
//! address; callers use `clear_default` before flagging a new one.

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::{
    model::address::{Address, CreateAddressParams, UpdateAddressParams},
    util::geo::Coordinates,
};

pub struct AddressRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AddressRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, params: CreateAddressParams) -> Result<Address, DbErr> {
        let entity = entity::address::ActiveModel {
            user_id: ActiveValue::Set(params.user_id),
            name: ActiveValue::Set(params.name),
            phone: ActiveValue::Set(params.phone),
            value: ActiveValue::Set(params.value),
            latitude: ActiveValue::Set(params.coordinates.map(|c| c.latitude)),
            longitude: ActiveValue::Set(params.coordinates.map(|c| c.longitude)),
            is_default: ActiveValue::Set(params.is_default),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Address::from_entity(entity))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Address>, DbErr> {
        let entity = entity::prelude::Address::find_by_id(id).one(self.db).await?;
        Ok(entity.map(Address::from_entity))
    }

    /// Lists a user's addresses, default first then newest.
    pub async fn list_by_user(&self, user_id: i32) -> Result<Vec<Address>, DbErr> {
        let entities = entity::prelude::Address::find()
            .filter(entity::address::Column::UserId.eq(user_id))
            .order_by_desc(entity::address::Column::IsDefault)
            .order_by_desc(entity::address::Column::CreatedAt)
            .order_by_desc(entity::address::Column::Id)
            .all(self.db)
            .await?;

        Ok(entities.into_iter().map(Address::from_entity).collect())
    }

    pub async fn count_by_user(&self, user_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Address::find()
            .filter(entity::address::Column::UserId.eq(user_id))
            .count(self.db)
            .await
    }

    /// Updates an address owned by the user.
    ///
    /// A new `value` without coordinates clears the stored coordinates so they
    /// are re-resolved.
    ///
    /// # Returns
    /// - `Ok(Some(Address))` - Updated address
    /// - `Ok(None)` - Address not found or owned by someone else
    pub async fn update(&self, params: UpdateAddressParams) -> Result<Option<Address>, DbErr> {
        let Some(entity) = entity::prelude::Address::find_by_id(params.id)
            .filter(entity::address::Column::UserId.eq(params.user_id))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: entity::address::ActiveModel = entity.into();
        if let Some(name) = params.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(phone) = params.phone {
            active.phone = ActiveValue::Set(phone);
        }
        let value_changed = params.value.is_some();
        if let Some(value) = params.value {
            active.value = ActiveValue::Set(value);
        }
        if params.coordinates.is_some() || value_changed {
            active.latitude = ActiveValue::Set(params.coordinates.map(|c| c.latitude));
            active.longitude = ActiveValue::Set(params.coordinates.map(|c| c.longitude));
        }

        let entity = active.update(self.db).await?;
        Ok(Some(Address::from_entity(entity)))
    }

    pub async fn set_coordinates(&self, id: i32, coordinates: Coordinates) -> Result<(), DbErr> {
        entity::prelude::Address::update_many()
            .col_expr(
                entity::address::Column::Latitude,
                Expr::value(coordinates.latitude),
            )
            .col_expr(
                entity::address::Column::Longitude,
                Expr::value(coordinates.longitude),
            )
            .filter(entity::address::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Clears the default flag on all of the user's addresses.
    pub async fn clear_default(&self, user_id: i32) -> Result<(), DbErr> {
        entity::prelude::Address::update_many()
            .col_expr(entity::address::Column::IsDefault, Expr::value(false))
            .filter(entity::address::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    pub async fn mark_default(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Address::update_many()
            .col_expr(entity::address::Column::IsDefault, Expr::value(true))
            .filter(entity::address::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// The user's most recently created address, if any.
    pub async fn most_recent(&self, user_id: i32) -> Result<Option<Address>, DbErr> {
        let entity = entity::prelude::Address::find()
            .filter(entity::address::Column::UserId.eq(user_id))
            .order_by_desc(entity::address::Column::CreatedAt)
            .order_by_desc(entity::address::Column::Id)
            .one(self.db)
            .await?;

        Ok(entity.map(Address::from_entity))
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Address::delete_by_id(id)
            .exec(self.db)
            .await?;
        Ok(())
    }
}
