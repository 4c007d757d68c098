//! Duplex WebSocket transport
//!
//! The bridge's outbound slot is drained on a fixed interval and each
//! message is sent to the peer as JSON text. Text frames from the peer are
//! parsed as control commands and handed to the polling loop.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use badge_protocol::ControlCommand;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::routes::AppState;

pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_client(socket, state))
}

async fn handle_client(mut socket: WebSocket, state: AppState) {
    info!("WebSocket client connected");

    let mut flush = tokio::time::interval(state.flush_every);
    flush.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = flush.tick() => {
                let Some(message) = state.bridge.try_take() else {
                    continue;
                };
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Could not encode {:?}: {}", message, e);
                        continue;
                    }
                };
                debug!("Sending {}", json);
                if socket.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ControlCommand>(&text) {
                            Ok(command) => state.bridge.submit_command(command),
                            Err(e) => warn!("Ignoring message {:?}: {}", text.as_str(), e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!("WebSocket receive failed: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}
