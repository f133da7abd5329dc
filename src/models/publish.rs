//! Publish payloads sent by OwnTracks-compatible clients.
//!
//! The JSON body carries a `_type` discriminator. Only `location` and `cmd` are
//! accepted; everything else is rejected with a fixed client error. See
//! <http://owntracks.org/booklet/tech/json/> for the client payload format.

use axum::http::{HeaderMap, HeaderName};
use serde::Deserialize;
use serde_json::Value;

use super::location::Location;

/// Header carrying the user name, set by the authenticating proxy.
pub const USER_HEADER: HeaderName = HeaderName::from_static("x-limit-u");
/// Header carrying the device name, set by the authenticating proxy.
pub const DEVICE_HEADER: HeaderName = HeaderName::from_static("x-limit-d");

const DISCRIMINATOR: &str = "_type";

/// A publish payload that passed discriminator and shape checks.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishRequest {
    Location(LocationReport),
    Command(Command),
}

/// Reasons a publish is refused with a client error.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishRejection {
    /// `_type` is missing or names a payload this endpoint does not handle.
    Unsupported(Option<String>),
    /// A `location` payload without usable `lat`/`lon`.
    MissingCoordinates,
    /// A recognized payload whose fields have the wrong types.
    Malformed(String),
    /// Neither the identity headers nor the topic name a user and device.
    UnresolvedIdentity,
}

impl PublishRejection {
    pub fn message(&self) -> &'static str {
        match self {
            PublishRejection::Unsupported(_) => "Not a location publish.",
            PublishRejection::MissingCoordinates => {
                "Location publish requires numeric lat and lon."
            }
            PublishRejection::Malformed(_) => "Malformed publish payload.",
            PublishRejection::UnresolvedIdentity => "Unable to resolve user and device.",
        }
    }
}

/// Wire shape of a `location` payload; coordinates are checked afterwards.
#[derive(Debug, Deserialize)]
struct LocationFields {
    lat: Option<Value>,
    lon: Option<Value>,
    topic: Option<String>,
    tst: Option<i64>,
    acc: Option<f64>,
    batt: Option<i32>,
    t: Option<String>,
    conn: Option<String>,
    tid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommandFields {
    action: Option<String>,
    topic: Option<String>,
}

/// A location report with validated coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReport {
    pub latitude: f64,
    pub longitude: f64,
    pub topic: Option<String>,
    pub timestamp: Option<i64>,
    pub accuracy: Option<f64>,
    pub battery: Option<i32>,
    pub trigger: Option<String>,
    pub connection: Option<String>,
    pub tracker_id: Option<String>,
}

impl LocationReport {
    /// Build the record to persist for this report.
    pub fn into_location(self, identity: Identity, address: Option<String>) -> Location {
        Location {
            user: identity.user,
            device: identity.device,
            latitude: self.latitude,
            longitude: self.longitude,
            address,
            timestamp: self.timestamp,
            accuracy: self.accuracy,
            battery: self.battery,
            trigger: self.trigger,
            connection: self.connection,
            tracker_id: self.tracker_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub action: CommandAction,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandAction {
    /// The client asks the server to report a location; it expects a 200.
    ReportLocation,
    Other(Option<String>),
}

impl From<Option<String>> for CommandAction {
    fn from(action: Option<String>) -> Self {
        match action.as_deref() {
            Some("reportLocation") => CommandAction::ReportLocation,
            _ => CommandAction::Other(action),
        }
    }
}

impl PublishRequest {
    /// Classify a raw JSON body by its `_type` discriminator.
    pub fn from_value(payload: Value) -> Result<Self, PublishRejection> {
        let kind = payload
            .get(DISCRIMINATOR)
            .and_then(Value::as_str)
            .map(str::to_owned);

        match kind.as_deref() {
            Some("location") => {
                let fields: LocationFields = serde_json::from_value(payload)
                    .map_err(|e| PublishRejection::Malformed(e.to_string()))?;
                let coordinate = |value: Option<Value>| value.as_ref().and_then(Value::as_f64);
                let (Some(latitude), Some(longitude)) =
                    (coordinate(fields.lat), coordinate(fields.lon))
                else {
                    return Err(PublishRejection::MissingCoordinates);
                };
                Ok(PublishRequest::Location(LocationReport {
                    latitude,
                    longitude,
                    topic: fields.topic,
                    timestamp: fields.tst,
                    accuracy: fields.acc,
                    battery: fields.batt,
                    trigger: fields.t,
                    connection: fields.conn,
                    tracker_id: fields.tid,
                }))
            }
            Some("cmd") => {
                let fields: CommandFields = serde_json::from_value(payload)
                    .map_err(|e| PublishRejection::Malformed(e.to_string()))?;
                Ok(PublishRequest::Command(Command {
                    action: fields.action.into(),
                    topic: fields.topic,
                }))
            }
            _ => Err(PublishRejection::Unsupported(kind)),
        }
    }
}

/// The (user, device) pair a publish is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub device: String,
}

impl Identity {
    /// Identity from the proxy headers; both must be present and non-empty.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };

        Some(Identity {
            user: header(&USER_HEADER)?,
            device: header(&DEVICE_HEADER)?,
        })
    }

    /// Identity from a `<prefix>/<user>/<device>` topic. The prefix is ignored.
    pub fn from_topic(topic: &str) -> Option<Self> {
        let mut segments = topic.split('/');
        let (_prefix, user, device) = (segments.next()?, segments.next()?, segments.next()?);
        if segments.next().is_some() || user.is_empty() || device.is_empty() {
            return None;
        }

        Some(Identity {
            user: user.to_owned(),
            device: device.to_owned(),
        })
    }

    /// Headers take precedence over the topic.
    pub fn resolve(headers: &HeaderMap, topic: Option<&str>) -> Option<Self> {
        Self::from_headers(headers).or_else(|| topic.and_then(Self::from_topic))
    }
}
