//! Server-side domain models and parameter types.
//!
//! This module contains domain models used throughout the service layer, representing
//! business entities and operation parameters. Domain models are converted from entity
//! models at the repository boundary and transformed to DTOs at the controller boundary.
//! Enumerated columns are stored as strings and parsed into the enums defined here.

pub mod address;
pub mod auth;
pub mod analytic;
pub mod cart;
pub mod catalog;
pub mod delivery;
pub mod discount;
pub mod notification;
pub mod order;
pub mod payment;
pub mod review;
pub mod user;
pub mod video;

/// Builds the `DbErr` returned when a stored enum column holds an unknown value.
pub(crate) fn invalid_column(column: &str, value: &str) -> sea_orm::DbErr {
    sea_orm::DbErr::Custom(format!("Invalid value '{}' in column {}", value, column))
}
