//! Application state shared across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::database::LocationStore;
use crate::services::{LocationStream, ReverseGeocoder};

/// Collaborators the publish handler works with.
///
/// Built once at startup and shared by reference; nothing here is mutated per request.
#[derive(Clone)]
pub struct PublishContext {
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub locations: Arc<dyn LocationStore>,
    pub stream: LocationStream,
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Geocoder, storage and live stream used by the publish endpoint
    pub publish: PublishContext,
    /// Renders the Prometheus exposition served at `/metrics`
    pub metrics_handle: PrometheusHandle,
}

impl axum::extract::FromRef<AppState> for PublishContext {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.publish.clone()
    }
}

impl axum::extract::FromRef<AppState> for LocationStream {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.publish.stream.clone()
    }
}
