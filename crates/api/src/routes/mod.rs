//! Route assembly.
//!
//! Route hierarchy:
//!
//! ```text
//! /health           liveness check
//! /start            submit a merge job (multipart POST)
//! /download         retrieve the merge result (confined to OUTPUT_DIR)
//! /ws               progress push channel (WebSocket upgrade)
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the full route tree.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/start", post(handlers::merge::start_merge))
        .route("/download", get(handlers::download::download_result))
        .route("/ws", get(ws::ws_handler))
}
