//! Domain error type shared across the workspace.

/// Domain-level errors produced by core logic and surfaced to users.
///
/// HTTP mapping happens in the API crate; this type stays transport-agnostic.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed a domain validation rule.
    #[error("{0}")]
    Validation(String),

    /// The operation conflicts with current state (e.g. a job is already
    /// running).
    #[error("{0}")]
    Conflict(String),

    /// A referenced resource does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
