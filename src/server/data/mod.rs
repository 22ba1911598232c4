//! Database repository layer for all domain entities.
//!
//! This module contains repository structs that handle database operations (CRUD) for each
//! domain in the application. Repositories use SeaORM entity models internally and return
//! domain models to maintain separation between the data layer and business logic layer.
//! Counters and stock are adjusted with conditional `UPDATE` statements so concurrent
//! requests cannot overshoot a limit.

pub mod address;
pub mod analytic;
pub mod auth_token;
pub mod cart;
pub mod category;
pub mod comment;
pub mod delivery_option;
pub mod discount;
pub mod follow;
pub mod notification;
pub mod order;
pub mod payment;
pub mod payment_card;
pub mod product;
pub mod review;
pub mod user;
pub mod video;
pub mod voucher;

#[cfg(test)]
mod test;
