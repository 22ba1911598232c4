//! Delivery addresses.
//!
//! Each user with addresses has exactly one default. Missing coordinates are
//! resolved through the geocoder when one is configured; a geocoding failure does
//! not block saving the address.

use sea_orm::DatabaseConnection;

use crate::server::{
    data::address::AddressRepository,
    error::AppError,
    model::address::{Address, CreateAddressParams, UpdateAddressParams},
    service::geocoding::Geocoder,
};

pub struct AddressService<'a> {
    db: &'a DatabaseConnection,
    geocoder: Option<&'a dyn Geocoder>,
}

impl<'a> AddressService<'a> {
    pub fn new(db: &'a DatabaseConnection, geocoder: Option<&'a dyn Geocoder>) -> Self {
        Self { db, geocoder }
    }

    pub async fn create(&self, mut params: CreateAddressParams) -> Result<Address, AppError> {
        validate_fields(&params.name, &params.phone, &params.value)?;

        let repo = AddressRepository::new(self.db);

        if params.coordinates.is_none() {
            params.coordinates = self.lookup(&params.value).await;
        }

        let is_first = repo.count_by_user(params.user_id).await? == 0;
        if is_first {
            params.is_default = true;
        } else if params.is_default {
            repo.clear_default(params.user_id).await?;
        }

        Ok(repo.create(params).await?)
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<Address>, AppError> {
        Ok(AddressRepository::new(self.db).list_by_user(user_id).await?)
    }

    pub async fn update(&self, params: UpdateAddressParams) -> Result<Address, AppError> {
        if params.name.as_deref().is_some_and(|v| v.trim().is_empty())
            || params.phone.as_deref().is_some_and(|v| v.trim().is_empty())
            || params.value.as_deref().is_some_and(|v| v.trim().is_empty())
        {
            return Err(AppError::BadRequest(
                "Address fields cannot be empty".to_string(),
            ));
        }

        let repo = AddressRepository::new(self.db);
        let address = repo
            .update(params)
            .await?
            .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;

        if address.coordinates.is_some() {
            return Ok(address);
        }

        match self.lookup(&address.value).await {
            Some(coordinates) => {
                repo.set_coordinates(address.id, coordinates).await?;
                Ok(Address {
                    coordinates: Some(coordinates),
                    ..address
                })
            }
            None => Ok(address),
        }
    }

    /// Makes the address the user's only default.
    pub async fn set_default(&self, id: i32, user_id: i32) -> Result<Address, AppError> {
        let repo = AddressRepository::new(self.db);
        let address = self.find_owned(id, user_id).await?;

        repo.clear_default(user_id).await?;
        repo.mark_default(address.id).await?;

        Ok(Address {
            is_default: true,
            ..address
        })
    }

    /// Deletes the address, promoting the most recent remaining one if it was the default.
    pub async fn delete(&self, id: i32, user_id: i32) -> Result<(), AppError> {
        let repo = AddressRepository::new(self.db);
        let address = self.find_owned(id, user_id).await?;

        repo.delete(address.id).await.map_err(|e| {
            tracing::warn!("Failed to delete address {}: {}", address.id, e);
            AppError::Conflict("Address is referenced by an order".to_string())
        })?;

        if address.is_default {
            if let Some(next) = repo.most_recent(user_id).await? {
                repo.mark_default(next.id).await?;
            }
        }

        Ok(())
    }

    /// Loads an address owned by the user.
    pub async fn find_owned(&self, id: i32, user_id: i32) -> Result<Address, AppError> {
        AddressRepository::new(self.db)
            .find_by_id(id)
            .await?
            .filter(|a| a.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Address not found".to_string()))
    }

    async fn lookup(&self, value: &str) -> Option<crate::server::util::geo::Coordinates> {
        let geocoder = self.geocoder?;
        match geocoder.geocode(value).await {
            Ok(coordinates) => coordinates,
            Err(e) => {
                tracing::warn!("Geocoding '{}' failed: {}", value, e);
                None
            }
        }
    }
}

fn validate_fields(name: &str, phone: &str, value: &str) -> Result<(), AppError> {
    if name.trim().is_empty() || phone.trim().is_empty() || value.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Name, phone and address are required".to_string(),
        ));
    }
    Ok(())
}
