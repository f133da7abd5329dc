//! `GET /api/stream`: live feed of stored locations over WebSocket.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::services::{LocationStream, StreamEvent};

pub async fn location_stream_handler(
    ws: WebSocketUpgrade,
    State(stream): State<LocationStream>,
) -> impl IntoResponse {
    let events = stream.subscribe();
    ws.on_upgrade(move |socket| forward_locations(socket, events))
}

async fn forward_locations(socket: WebSocket, mut events: broadcast::Receiver<StreamEvent>) {
    let client_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    info!("✅ Location stream client connected: {}", client_id);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("Failed to serialize stream event: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = sender.send(Message::Text(json.into())).await {
                        warn!("Failed to send location to client {}: {}", client_id, e);
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Location stream client {} lagged, skipped {} events", client_id, skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Pings are answered by axum; other client messages are ignored
                Some(Ok(_)) => {}
            },
        }
    }

    info!("❌ Location stream client disconnected: {}", client_id);
}
