// Metrics endpoint for Prometheus

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

/// Prometheus metrics endpoint
pub async fn get_prometheus_metrics(State(app_state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        app_state.metrics_handle.render(),
    )
        .into_response()
}
