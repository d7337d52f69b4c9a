//! Bridges job execution onto the client-facing push channel.

pub mod progress;

pub use progress::spawn_event_forwarder;
