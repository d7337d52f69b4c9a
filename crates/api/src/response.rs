//! Shared response envelope types for API handlers.
//!
//! Submission responses carry a status discriminator: `"started"` on
//! acceptance, `"error"` plus a message otherwise (the error side is
//! produced by [`crate::error::AppError`]'s `IntoResponse`).

use serde::Serialize;

/// Body of a successful `POST /start`: the job was accepted and progress
/// will arrive over the push channel.
#[derive(Debug, Serialize)]
pub struct StartAccepted {
    pub status: &'static str,
}

impl Default for StartAccepted {
    fn default() -> Self {
        Self { status: "started" }
    }
}
