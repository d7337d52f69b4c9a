//! In-process event distribution for merge-job progress.
//!
//! The pipeline reporter publishes [`docfuse_core::push::PushMessage`]s on
//! an [`EventBus`]; the API server's WebSocket forwarder (and any other
//! interested party) subscribes.

pub mod bus;

pub use bus::EventBus;
