//! Delivery address domain models.

use crate::{
    model::address::{AddressDto, CreateAddressDto, UpdateAddressDto},
    server::util::geo::Coordinates,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub phone: String,
    pub value: String,
    pub coordinates: Option<Coordinates>,
    pub is_default: bool,
}

impl Address {
    pub fn from_entity(entity: entity::address::Model) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            name: entity.name,
            phone: entity.phone,
            value: entity.value,
            coordinates: Coordinates::from_parts(entity.latitude, entity.longitude),
            is_default: entity.is_default,
        }
    }

    pub fn into_dto(self) -> AddressDto {
        AddressDto {
            id: self.id,
            name: self.name,
            phone: self.phone,
            value: self.value,
            latitude: self.coordinates.map(|c| c.latitude),
            longitude: self.coordinates.map(|c| c.longitude),
            is_default: self.is_default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateAddressParams {
    pub user_id: i32,
    pub name: String,
    pub phone: String,
    pub value: String,
    pub coordinates: Option<Coordinates>,
    pub is_default: bool,
}

impl CreateAddressParams {
    pub fn from_dto(user_id: i32, dto: CreateAddressDto) -> Self {
        Self {
            user_id,
            name: dto.name,
            phone: dto.phone,
            value: dto.value,
            coordinates: Coordinates::from_parts(dto.latitude, dto.longitude),
            is_default: dto.is_default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateAddressParams {
    pub id: i32,
    pub user_id: i32,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub value: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl UpdateAddressParams {
    pub fn from_dto(id: i32, user_id: i32, dto: UpdateAddressDto) -> Self {
        Self {
            id,
            user_id,
            name: dto.name,
            phone: dto.phone,
            value: dto.value,
            coordinates: Coordinates::from_parts(dto.latitude, dto.longitude),
        }
    }
}
