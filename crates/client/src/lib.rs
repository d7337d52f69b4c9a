//! Client-side session and protocol driver for the docfuse merge service.
//!
//! [`session::MergeSession`] holds everything the submitting side tracks
//! for one job at a time: the document batch, the selected/edited module
//! configuration, the single-submission guard, the job state machine, and
//! the progress view. [`submit`] performs a submission against the HTTP
//! API, and [`channel`] consumes the WebSocket push channel that delivers
//! progress snapshots until a terminal event arrives.

pub mod api;
pub mod channel;
pub mod reconnect;
pub mod session;
pub mod submit;

pub use api::MergeApi;
pub use channel::ProgressChannel;
pub use session::MergeSession;
