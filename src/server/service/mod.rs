//! Service layer for business logic and orchestration.
//!
//! This module contains the service layer of the application, which sits between the
//! controller (API) layer and the data (repository) layer. Services are responsible for:
//!
//! - **Business Logic**: Implementing core business rules and validation
//! - **Orchestration**: Coordinating repository calls and external APIs (geocoder,
//!   courier, payment gateway)
//! - **Domain Models**: Working with domain models rather than DTOs or entity models

pub mod address;
pub mod analytics;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod delivery;
pub mod discount;
pub mod geocoding;
pub mod notification;
pub mod order;
pub mod payment;
pub mod review;
pub mod storage;
pub mod user;
pub mod video;
