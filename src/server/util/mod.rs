//! Small helpers shared across services.

pub mod geo;
pub mod pagination;
pub mod token;
