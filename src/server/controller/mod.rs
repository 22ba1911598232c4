//! HTTP handlers grouped by resource.
//!
//! Handlers extract state, the authenticated user and the request body, convert
//! DTOs into domain parameters and delegate to the matching service.

pub mod address;
pub mod analytics;
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
