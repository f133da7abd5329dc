//! Reverse geocoding of reported coordinates.
//!
//! Handlers depend on the [`ReverseGeocoder`] trait; [`MapboxGeocoder`] is the
//! production implementation backed by the Mapbox Geocoding v5 API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::GeocodeConfig;

/// Human-readable description of a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_name: String,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geocoder responded with status {0}")]
    Status(u16),
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Resolve a coordinate to a place. `Ok(None)` means no match.
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Place>, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    place_name: Option<String>,
}

/// Mapbox Geocoding v5 client
#[derive(Clone)]
pub struct MapboxGeocoder {
    client: Client,
    base_url: String,
    access_token: String,
}

impl MapboxGeocoder {
    pub fn new(config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    /// Mapbox orders coordinates longitude first.
    fn reverse_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{},{}.json",
            self.base_url, longitude, latitude
        )
    }
}

#[async_trait]
impl ReverseGeocoder for MapboxGeocoder {
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Place>, GeocodeError> {
        let response = self
            .client
            .get(self.reverse_url(latitude, longitude))
            .query(&[("access_token", self.access_token.as_str()), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let collection: FeatureCollection = response.json().await?;
        let place = collection
            .features
            .into_iter()
            .find_map(|feature| feature.place_name)
            .map(|place_name| Place { place_name });

        debug!(
            latitude,
            longitude,
            matched = place.is_some(),
            "Reverse geocode completed"
        );

        Ok(place)
    }
}
