use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddressDto {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub value: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAddressDto {
    pub name: String,
    pub phone: String,
    pub value: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAddressDto {
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Changing the text clears stored coordinates unless new ones are given
    pub value: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
