//! Request authentication and role checks.

pub mod auth;
