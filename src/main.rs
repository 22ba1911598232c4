mod model;
mod server;

use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::server::{
    config::Config, error::AppError, scheduler::maintenance, startup, state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;
    let http_client = startup::setup_reqwest_client()?;
    let sms = startup::setup_sms(&config, &http_client);
    let geocoder = startup::setup_geocoder(&config, &http_client);
    let courier = startup::setup_courier(&config, &http_client)?;

    if config.payment.is_none() {
        tracing::warn!("Payment gateway not configured, GATEWAY checkout is disabled");
    }

    tokio::fs::create_dir_all(config.upload_dir.join("tmp")).await?;
    tokio::fs::create_dir_all(config.upload_dir.join("files")).await?;

    // Start maintenance scheduler
    let scheduler_db = db.clone();
    let scheduler_upload_dir = config.upload_dir.clone();
    let retention_hours = config.upload_tmp_retention_hours;
    tokio::spawn(async move {
        if let Err(e) =
            maintenance::start_scheduler(scheduler_db, scheduler_upload_dir, retention_hours).await
        {
            tracing::error!("Maintenance scheduler error: {}", e);
        }
    });

    let state = AppState::new(db, &config, sms, geocoder, courier);
    let app = server::router::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Starting server on {} ({})", config.bind_addr, config.app_url);

    axum::serve(listener, app).await?;

    Ok(())
}
