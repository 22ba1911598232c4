use std::{sync::Arc, time::Duration};

use crate::server::{
    config::Config,
    error::AppError,
    service::{
        auth::sms::{LogSmsSender, SmsSender, TwilioSmsSender},
        delivery::courier::{CourierApi, GrabExpressClient},
        geocoding::{CachedGeocoder, Geocoder, GoogleGeocoder},
    },
};

/// Connects to the Sqlite database and runs pending migrations.
///
/// Establishes a connection pool to the Sqlite database using the connection string from
/// configuration, then automatically runs all pending SeaORM migrations to ensure the database
/// schema is up-to-date. This function must complete successfully before the application can
/// access the database.
///
/// # Arguments
/// - `config` - Application configuration containing the database URL
///
/// # Returns
/// - `Ok(DatabaseConnection)` - Connected database with migrations applied
/// - `Err(Error)` - Failed to connect to database or run migrations
pub async fn connect_to_database(config: &Config) -> Result<sea_orm::DatabaseConnection, AppError> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Builds the shared HTTP client for outbound provider calls.
///
/// Redirects are disabled so a provider response can never bounce requests to
/// another host.
pub fn setup_reqwest_client() -> Result<reqwest::Client, AppError> {
    let client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(15))
        .build()?;

    Ok(client)
}

/// Creates the cached Google geocoder when an API key is configured.
pub fn setup_geocoder(config: &Config, http_client: &reqwest::Client) -> Option<Arc<dyn Geocoder>> {
    let Some(api_key) = config.geocoding_api_key.clone() else {
        tracing::warn!("GEOCODING_API_KEY not set, delivery distance pricing is disabled");
        return None;
    };

    let google: Arc<dyn Geocoder> = Arc::new(GoogleGeocoder::new(http_client.clone(), api_key));

    Some(Arc::new(CachedGeocoder::new(
        google,
        Duration::from_secs(config.geocoding_cache_ttl_seconds),
    )))
}

/// Creates the courier client when partner credentials are configured.
pub fn setup_courier(
    config: &Config,
    http_client: &reqwest::Client,
) -> Result<Option<Arc<dyn CourierApi>>, AppError> {
    let Some(courier) = config.courier.clone() else {
        tracing::warn!("Courier credentials not set, courier delivery is disabled");
        return Ok(None);
    };

    let client = GrabExpressClient::new(http_client.clone(), courier)?;
    Ok(Some(Arc::new(client)))
}

/// Creates the SMS sender, logging messages instead when no account is configured.
pub fn setup_sms(config: &Config, http_client: &reqwest::Client) -> Arc<dyn SmsSender> {
    match config.sms.clone() {
        Some(sms) => Arc::new(TwilioSmsSender::new(http_client.clone(), sms)),
        None => {
            tracing::warn!("SMS account not set, verification codes will only be logged");
            Arc::new(LogSmsSender)
        }
    }
}
