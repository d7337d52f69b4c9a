use std::sync::Arc;

use docfuse_core::guard::SubmissionGuard;
use docfuse_events::EventBus;
use docfuse_pipeline::DocumentMerger;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (all inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Event bus carrying job progress messages.
    pub event_bus: Arc<EventBus>,
    /// The single-job submission guard. Held from acceptance of a
    /// submission until its job task finishes.
    pub job_guard: Arc<SubmissionGuard>,
    /// The external merge implementation.
    pub merger: Arc<dyn DocumentMerger>,
}
