//! Handler for retrieving the merge result.
//!
//! The download link pushed with `process_done` points here. Only files
//! under the configured output directory are served; the attachment name
//! is uniquified so repeated downloads never collide in the browser.

use std::path::Path;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use docfuse_core::error::CoreError;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub file_path: String,
}

/// GET /download?file_path=...
pub async fn download_result(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> AppResult<impl IntoResponse> {
    if query.file_path.trim().is_empty() {
        return Err(AppError::BadRequest("Missing file path parameter".into()));
    }

    let output_root = tokio::fs::canonicalize(&state.config.output_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Output directory unavailable: {e}")))?;

    // Canonicalize before the prefix check so `..` segments and symlinks
    // cannot escape the output directory.
    let requested = tokio::fs::canonicalize(&query.file_path)
        .await
        .map_err(|_| AppError::Core(CoreError::NotFound { entity: "Result file" }))?;

    if !requested.starts_with(&output_root) {
        return Err(AppError::Forbidden("Illegal download path".into()));
    }
    if !requested.is_file() {
        return Err(CoreError::NotFound { entity: "Result file" }.into());
    }

    let bytes = tokio::fs::read(&requested)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read result file: {e}")))?;

    let download_name = unique_download_name(&requested);
    tracing::info!(
        file = %requested.display(),
        download_name = %download_name,
        size = bytes.len(),
        "Serving merge result",
    );

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{download_name}\""),
            ),
        ],
        bytes,
    ))
}

/// Build a download file name that cannot collide across retrievals:
/// `<stem>_<timestamp>_<suffix><ext>`.
fn unique_download_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result".to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..8];
    format!("{stem}_{timestamp}_{suffix}{ext}")
}
