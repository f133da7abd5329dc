//! `POST /api/publish`: location reports and commands from OwnTracks clients.
//!
//! Authentication happens at the reverse proxy; by the time a request reaches this
//! handler the identity headers, when present, are trusted as-is.

use std::time::Instant;

use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::MethodFilter,
    Json,
};
use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::app_state::PublishContext;
use crate::error::{handle_rejection, ApiError};
use crate::handlers::response::ApiResponse;
use crate::models::{
    Command, CommandAction, Identity, LocationReport, PublishRejection, PublishRequest,
};

pub const METHOD: MethodFilter = MethodFilter::POST;
pub const PATH: &str = "/api/publish";

/// Envelope and status returned for every handled publish.
#[derive(Debug)]
pub struct PublishResponse {
    pub status: StatusCode,
    pub body: ApiResponse,
}

impl PublishResponse {
    fn created() -> Self {
        Self {
            status: StatusCode::CREATED,
            body: ApiResponse::ok(),
        }
    }

    fn acknowledged() -> Self {
        Self {
            status: StatusCode::OK,
            body: ApiResponse::ok(),
        }
    }
}

impl From<PublishRejection> for PublishResponse {
    fn from(rejection: PublishRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiResponse::failure(rejection.message()),
        }
    }
}

impl IntoResponse for PublishResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub async fn publish(
    State(ctx): State<PublishContext>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<PublishResponse, ApiError> {
    let Json(payload) = payload.map_err(handle_rejection)?;
    handle_publish(&ctx, &headers, payload).await
}

/// Dispatch a raw publish body on its `_type` discriminator.
pub async fn handle_publish(
    ctx: &PublishContext,
    headers: &HeaderMap,
    payload: Value,
) -> Result<PublishResponse, ApiError> {
    let request = match PublishRequest::from_value(payload) {
        Ok(request) => request,
        Err(rejection) => {
            debug!(?rejection, "Rejected publish");
            return Ok(rejection.into());
        }
    };

    match request {
        PublishRequest::Location(report) => publish_location(ctx, headers, report).await,
        PublishRequest::Command(command) => Ok(acknowledge_command(command)),
    }
}

async fn publish_location(
    ctx: &PublishContext,
    headers: &HeaderMap,
    report: LocationReport,
) -> Result<PublishResponse, ApiError> {
    let Some(identity) = Identity::resolve(headers, report.topic.as_deref()) else {
        return Ok(PublishRejection::UnresolvedIdentity.into());
    };

    let address = extract_address(ctx, report.latitude, report.longitude).await;
    let location = report.into_location(identity, address);

    let started = Instant::now();
    let id = ctx.locations.insert(&location).await?;
    histogram!("location_db_write_ms").record(started.elapsed().as_secs_f64() * 1000.0);

    let subscribers = ctx.stream.emit_location(&location);

    counter!(
        "locations_published_total",
        "user" => location.user.clone(),
        "device" => location.device.clone()
    )
    .increment(1);

    info!(
        location_id = %id,
        user = %location.user,
        device = %location.device,
        has_address = location.address.is_some(),
        subscribers,
        "Location stored"
    );

    Ok(PublishResponse::created())
}

/// Reverse geocode a coordinate. Any failure degrades to no address.
async fn extract_address(ctx: &PublishContext, latitude: f64, longitude: f64) -> Option<String> {
    counter!("geocode_requests_total").increment(1);

    match ctx.geocoder.reverse_geocode(latitude, longitude).await {
        Ok(Some(place)) => Some(place.place_name),
        Ok(None) => {
            counter!("geocode_failures_total", "reason" => "no_match").increment(1);
            debug!(latitude, longitude, "No place found for coordinate");
            None
        }
        Err(e) => {
            counter!("geocode_failures_total", "reason" => "error").increment(1);
            warn!(latitude, longitude, error = %e, "Reverse geocoding failed");
            None
        }
    }
}

// Clients queue every later publish behind a non-2xx reply, so all commands get a 200.
fn acknowledge_command(command: Command) -> PublishResponse {
    match command.action {
        CommandAction::ReportLocation => {
            debug!(topic = ?command.topic, "Acknowledged reportLocation command");
        }
        CommandAction::Other(action) => {
            debug!(?action, topic = ?command.topic, "Acknowledged unsupported command");
        }
    }

    PublishResponse::acknowledged()
}
