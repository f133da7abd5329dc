//! Application startup and initialization logic.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::app_state::{AppState, PublishContext};
use crate::config::Config;
use crate::database::{self, PgLocationRepository};
use crate::services::{LocationStream, MapboxGeocoder};

/// Initialize application services and create the AppState.
pub async fn initialize_app(config: &Config) -> Result<AppState> {
    info!("🚀 Starting Orion location gateway ({})", config.environment);

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("✅ Prometheus metrics initialized");

    let db_pool = database::setup_database(&config.database_url, config.max_connections).await?;
    info!("✅ PostgreSQL connection established");

    database::run_migrations(&db_pool).await?;
    info!("✅ Database migrations completed");

    let geocoder = MapboxGeocoder::new(&config.geocode).map_err(|e| {
        error!("Failed to create geocoding client: {}", e);
        anyhow::anyhow!("Failed to create geocoding client: {}", e)
    })?;
    info!("✅ Geocoder initialized (base URL: {})", config.geocode.base_url);

    let location_stream = LocationStream::new(config.stream_capacity);
    info!(
        "✅ Live location stream initialized (capacity: {})",
        config.stream_capacity
    );

    let app_state = AppState {
        config: config.clone(),
        publish: PublishContext {
            geocoder: Arc::new(geocoder),
            locations: Arc::new(PgLocationRepository::new(db_pool)),
            stream: location_stream,
        },
        metrics_handle,
    };

    info!("📍 Ready to receive location publishes");

    Ok(app_state)
}

/// Wait for shutdown signal.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
