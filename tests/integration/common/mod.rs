//! Shared fixtures for router-level tests: in-memory collaborators and app wiring.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use uuid::Uuid;

use orion::config::{Config, GeocodeConfig};
use orion::database::LocationStore;
use orion::models::Location;
use orion::services::{GeocodeError, LocationStream, Place, ReverseGeocoder};
use orion::{ApiError, AppState, PublishContext};

/// Geocoder answering every coordinate with the same place (or none)
pub struct FixedGeocoder {
    place: Option<String>,
    pub calls: Mutex<Vec<(f64, f64)>>,
}

impl FixedGeocoder {
    pub fn resolving_to(place: &str) -> Self {
        Self {
            place: Some(place.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn without_match() -> Self {
        Self {
            place: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for FixedGeocoder {
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Place>, GeocodeError> {
        self.calls.lock().unwrap().push((latitude, longitude));
        Ok(self.place.clone().map(|place_name| Place { place_name }))
    }
}

#[derive(Default)]
pub struct InMemoryLocationStore {
    pub locations: Mutex<Vec<Location>>,
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn insert(&self, location: &Location) -> Result<Uuid, ApiError> {
        self.locations.lock().unwrap().push(location.clone());
        Ok(Uuid::new_v4())
    }
}

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        port: 0,
        database_url: "postgres://localhost/orion_test".to_string(),
        max_connections: 1,
        request_timeout: 5,
        log_level: "orion=debug".to_string(),
        geocode: GeocodeConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            access_token: "test-token".to_string(),
            timeout_secs: 1,
        },
        stream_capacity: 16,
    }
}

pub struct TestApp {
    pub router: Router,
    pub geocoder: Arc<FixedGeocoder>,
    pub store: Arc<InMemoryLocationStore>,
    pub stream: LocationStream,
}

pub fn spawn_app(geocoder: FixedGeocoder) -> TestApp {
    spawn_app_with_metrics(geocoder, PrometheusBuilder::new().build_recorder().handle())
}

/// Build the app around a caller-held recorder so `/metrics` renders what it records
pub fn spawn_app_with_metrics(geocoder: FixedGeocoder, metrics_handle: PrometheusHandle) -> TestApp {
    let geocoder = Arc::new(geocoder);
    let store = Arc::new(InMemoryLocationStore::default());
    let config = test_config();
    let stream = LocationStream::new(config.stream_capacity);

    let state = AppState {
        config,
        publish: PublishContext {
            geocoder: geocoder.clone(),
            locations: store.clone(),
            stream: stream.clone(),
        },
        metrics_handle,
    };

    TestApp {
        router: orion::router::build_router(state),
        geocoder,
        store,
        stream,
    }
}
