//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for push-channel messages.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use docfuse_core::push::PushMessage;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus for job progress messages.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published message. Since the protocol
/// carries a single logical job stream, the bus carries the wire message
/// type directly rather than a generic event envelope.
pub struct EventBus {
    sender: broadcast::Sender<PushMessage>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a message to all current subscribers.
    ///
    /// If there are no active subscribers the message is silently dropped;
    /// a job running with no connected client is not an error.
    pub fn publish(&self, message: PushMessage) {
        // Ignore the SendError: it only means there are zero receivers.
        let _ = self.sender.send(message);
    }

    /// Subscribe to all messages published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PushMessage> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
