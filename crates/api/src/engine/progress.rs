//! Event-bus to WebSocket forwarding for job progress.
//!
//! The pipeline publishes wire-ready [`PushMessage`]s on the event bus;
//! this task serializes each one and broadcasts it to every connected
//! WebSocket client.

use std::sync::Arc;

use axum::extract::ws::Message;
use docfuse_core::push::PushMessage;
use docfuse_events::EventBus;
use tokio::sync::broadcast::error::RecvError;

use crate::ws::WsManager;

/// Spawn the forwarding task.
///
/// Runs until the event bus sender side is dropped. A lagged receiver
/// only skips messages: the next full snapshot makes the clients
/// consistent again, so lag is logged and tolerated.
pub fn spawn_event_forwarder(
    event_bus: Arc<EventBus>,
    ws_manager: Arc<WsManager>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = event_bus.subscribe();

        loop {
            match rx.recv().await {
                Ok(message) => {
                    broadcast_message(&ws_manager, &message).await;
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event forwarder lagged behind the bus");
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Event bus closed, stopping forwarder");
                    return;
                }
            }
        }
    })
}

/// Serialize a push message and broadcast it to all WebSocket clients.
async fn broadcast_message(ws_manager: &WsManager, message: &PushMessage) {
    match serde_json::to_string(message) {
        Ok(text) => {
            ws_manager.broadcast(Message::Text(text.into())).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize push message");
        }
    }
}
