use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::Location;

/// Events delivered to live stream subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A location was stored
    Location(Location),
}

/// In-process fan-out of stored locations.
///
/// Emitting never blocks and never fails the caller; slow subscribers lag and
/// skip events instead.
#[derive(Clone)]
pub struct LocationStream {
    sender: broadcast::Sender<StreamEvent>,
}

impl LocationStream {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a stored location. Returns how many subscribers received it.
    pub fn emit_location(&self, location: &Location) -> usize {
        match self.sender.send(StreamEvent::Location(location.clone())) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("No live stream subscribers; location not forwarded");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
