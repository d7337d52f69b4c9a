//! Core domain logic for the docfuse document-merge platform.
//!
//! Pure types and functions only: no I/O, no async. The server
//! (`docfuse-api`), the job harness (`docfuse-pipeline`), and the client
//! session (`docfuse-client`) all build on the types defined here.

pub mod config_override;
pub mod error;
pub mod guard;
pub mod job_state;
pub mod module_config;
pub mod progress;
pub mod push;
pub mod upload;
