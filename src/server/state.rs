//! Application state shared across all request handlers.
//!
//! This module defines the `AppState` struct which holds all shared resources and
//! dependencies needed by the application. The state is initialized once during startup
//! and then cloned for each request handler through Axum's state extraction.
//!
//! Third-party integrations (geocoding, courier, payment gateway) are optional. When
//! one is not configured the features depending on it report themselves unavailable
//! instead of failing at startup.

use sea_orm::DatabaseConnection;
use std::{path::PathBuf, sync::Arc};

use crate::server::{
    config::{Config, PaymentGatewayConfig},
    service::{
        auth::{otp::OtpService, sms::SmsSender},
        delivery::courier::CourierApi,
        geocoding::Geocoder,
    },
};

/// Application state containing shared resources and dependencies.
///
/// All fields are cheap to clone:
/// - `DatabaseConnection` is a connection pool (clones share the pool)
/// - `OtpService` shares its code store through an `Arc`
/// - Integrations are held behind `Arc<dyn Trait>`
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for accessing persistent storage.
    pub db: DatabaseConnection,

    /// Root directory for uploaded media (`tmp/` and `files/` live beneath it).
    pub upload_dir: PathBuf,

    /// Lifetime of newly issued bearer tokens.
    pub token_ttl_days: i64,

    /// Pending phone verification codes.
    pub otp: OtpService,

    /// Outbound SMS; falls back to logging when no account is configured.
    pub sms: Arc<dyn SmsSender>,

    /// Address geocoder with cache, absent without an API key.
    pub geocoder: Option<Arc<dyn Geocoder>>,

    /// On-demand courier client, absent without partner credentials.
    pub courier: Option<Arc<dyn CourierApi>>,

    /// Hosted payment page merchant settings.
    pub payment: Option<PaymentGatewayConfig>,
}

impl AppState {
    /// Creates a new application state with the provided dependencies.
    ///
    /// # Arguments
    /// - `db` - Database connection pool
    /// - `config` - Application configuration the scalar settings are taken from
    /// - `sms` - SMS sender used for verification codes
    /// - `geocoder` - Optional geocoder
    /// - `courier` - Optional courier client
    ///
    /// # Returns
    /// - `AppState` - Initialized application state ready for use
    pub fn new(
        db: DatabaseConnection,
        config: &Config,
        sms: Arc<dyn SmsSender>,
        geocoder: Option<Arc<dyn Geocoder>>,
        courier: Option<Arc<dyn CourierApi>>,
    ) -> Self {
        Self {
            db,
            upload_dir: config.upload_dir.clone(),
            token_ttl_days: config.token_ttl_days,
            otp: OtpService::new(),
            sms,
            geocoder,
            courier,
            payment: config.payment.clone(),
        }
    }

    pub fn geocoder(&self) -> Option<&dyn Geocoder> {
        self.geocoder.as_deref()
    }

    pub fn courier(&self) -> Option<&dyn CourierApi> {
        self.courier.as_deref()
    }
}

#[cfg(test)]
impl AppState {
    /// State with no third-party integrations, for router and middleware tests.
    pub fn for_tests(db: DatabaseConnection, upload_dir: PathBuf) -> Self {
        use crate::server::service::auth::sms::LogSmsSender;

        Self {
            db,
            upload_dir,
            token_ttl_days: 30,
            otp: OtpService::new(),
            sms: Arc::new(LogSmsSender),
            geocoder: None,
            courier: None,
            payment: None,
        }
    }
}
