use serde::{Deserialize, Serialize};

/// A single reported position, ready to be persisted.
///
/// `address` is always serialized, as `null` when reverse geocoding produced nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub user: String,
    pub device: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    /// Client-side fix time, seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Horizontal accuracy in metres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Battery level in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_id: Option<String>,
}
