//! Wire types exchanged with API clients.
//!
//! Every request and response body is a DTO defined here. Server-side domain
//! models convert into these at the controller boundary.

pub mod address;
pub mod analytic;
pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod delivery;
pub mod discount;
pub mod notification;
pub mod order;
pub mod payment;
pub mod review;
pub mod upload;
pub mod user;
pub mod video;
