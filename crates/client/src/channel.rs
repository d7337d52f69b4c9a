//! WebSocket push-channel consumer.
//!
//! Connects to the merge service's `/ws` endpoint and applies incoming
//! messages to the session in arrival order. The channel is persistent
//! (it outlives individual jobs), so dropped connections are re-established
//! with backoff (see [`crate::reconnect`]).

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream};
use tokio_util::sync::CancellationToken;

use docfuse_core::push::parse_push_message;

use crate::reconnect::{reconnect_loop, ReconnectConfig};
use crate::session::MergeSession;

/// The underlying WebSocket stream type.
pub type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Configuration handle for the push channel.
pub struct ProgressChannel {
    ws_url: String,
}

/// A live connection to the push channel.
pub struct ChannelConnection {
    pub ws_stream: WsStream,
}

/// Errors establishing the push channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Connection error: {0}")]
    Connection(String),
}

impl ProgressChannel {
    /// Create a channel handle.
    ///
    /// * `ws_url` - full WebSocket URL, e.g. `ws://host:5000/ws`.
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Establish the WebSocket connection.
    pub async fn connect(&self) -> Result<ChannelConnection, ChannelError> {
        let (ws_stream, _response) = connect_async(&self.ws_url).await.map_err(|e| {
            ChannelError::Connection(format!("Failed to connect to {}: {e}", self.ws_url))
        })?;

        tracing::info!(url = %self.ws_url, "Push channel connected");
        Ok(ChannelConnection { ws_stream })
    }
}

/// Consume messages from an established connection until it closes.
///
/// Each text frame is parsed into a typed push message and applied to the
/// session; frames that fail to parse are logged and skipped so one
/// malformed event cannot stall the stream.
pub async fn process_messages(ws_stream: &mut WsStream, session: &Mutex<MergeSession>) {
    while let Some(msg_result) = ws_stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match parse_push_message(&text) {
                Ok(msg) => {
                    session
                        .lock()
                        .expect("session lock poisoned")
                        .handle_push(msg);
                }
                Err(e) => {
                    tracing::warn!(error = %e, raw_message = %text, "Failed to parse push message");
                }
            },
            Ok(Message::Binary(_)) => {
                tracing::trace!("Ignoring binary frame on push channel");
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Handled automatically by tungstenite.
            }
            Ok(Message::Close(frame)) => {
                tracing::info!(?frame, "Push channel closed by server");
                break;
            }
            Ok(Message::Frame(_)) => {}
            Err(e) => {
                tracing::error!(error = %e, "Push channel receive error");
                break;
            }
        }
    }
}

/// Keep the push channel alive until cancelled: connect, consume, and
/// reconnect with backoff whenever the connection drops.
pub async fn run_channel(
    channel: &ProgressChannel,
    session: Arc<Mutex<MergeSession>>,
    cancel: &CancellationToken,
) {
    let reconnect_config = ReconnectConfig::default();

    loop {
        let conn = match channel.connect().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Connection failed, entering reconnect loop");
                match reconnect_loop(channel, &reconnect_config, cancel).await {
                    Some(conn) => conn,
                    None => return, // cancelled
                }
            }
        };

        let mut ws_stream = conn.ws_stream;
        process_messages(&mut ws_stream, &session).await;

        if cancel.is_cancelled() {
            return;
        }

        // Dropped connection: the next iteration dials once immediately and
        // falls into the backoff loop if that fails too.
        tracing::info!("Push channel lost, reconnecting");
    }
}
