//! Handler for merge-job submission.
//!
//! Accepts one multipart request carrying the document batch (repeated
//! `files` entries), exactly one `module_config` entry, and the scalar
//! `days` parameter. Enforces the single-job guard, stages the uploads,
//! and spawns the merge job.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use docfuse_core::error::CoreError;
use docfuse_core::upload::FilePayload;
use docfuse_pipeline::{run_merge_job, MergeJobSpec};

use crate::error::{AppError, AppResult};
use crate::response::StartAccepted;
use crate::state::AppState;

/// Retention parameter used when the `days` field is absent.
const DEFAULT_DAYS: u32 = 7;

/// POST /start
///
/// Validation failures respond with the error discriminator and leave no
/// state behind; only an accepted submission touches the upload directory
/// or the guard.
pub async fn start_merge(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<StartAccepted>> {
    let mut files: Vec<FilePayload> = Vec::new();
    let mut module_config: Option<FilePayload> = None;
    let mut days_raw: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        // Copy the field name out: reading the body consumes the field.
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("files") => {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                files.push(FilePayload::new(file_name, data.to_vec()));
            }
            Some("module_config") => {
                let file_name = field
                    .file_name()
                    .unwrap_or(docfuse_core::module_config::DEFAULT_CONFIG_FILE_NAME)
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                module_config = Some(FilePayload::new(file_name, data.to_vec()));
            }
            Some("days") => {
                days_raw = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    // Validations, in order; each rejection is distinct and side-effect free.
    if files.is_empty() {
        return Err(CoreError::Validation("No documents were uploaded".into()).into());
    }
    let module_config = module_config.ok_or_else(|| {
        CoreError::Validation("Missing required module configuration file".into())
    })?;
    let days: u32 = match days_raw {
        None => DEFAULT_DAYS,
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest("invalid days value".into()))?,
    };

    // Single-job guard: taken before any filesystem work, released by the
    // job task when the run reaches a terminal state.
    if !state.job_guard.try_acquire() {
        return Err(CoreError::Conflict("A merge job is already running".into()).into());
    }

    let staged = stage_uploads(&state.config.upload_dir, &files, &module_config).await;
    let config_path = match staged {
        Ok(path) => path,
        Err(e) => {
            state.job_guard.release();
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&state.config.output_dir).await {
        state.job_guard.release();
        return Err(AppError::InternalError(format!(
            "Failed to create output directory: {e}"
        )));
    }

    let spec = MergeJobSpec {
        input_dir: state.config.upload_dir.clone(),
        output_dir: state.config.output_dir.clone(),
        config_path,
        days,
    };

    tracing::info!(
        files = files.len(),
        module_config = %module_config.file_name,
        days,
        "Merge job accepted",
    );

    let merger = Arc::clone(&state.merger);
    let bus = Arc::clone(&state.event_bus);
    let guard = Arc::clone(&state.job_guard);
    tokio::spawn(async move {
        run_merge_job(merger, spec, bus).await;
        // The runner has emitted the terminal events; the submission slot
        // is free again.
        guard.release();
    });

    Ok(Json(StartAccepted::default()))
}

/// Clear and repopulate the upload directory with the submitted batch.
///
/// Returns the staged path of the module configuration file.
async fn stage_uploads(
    upload_dir: &Path,
    files: &[FilePayload],
    module_config: &FilePayload,
) -> AppResult<PathBuf> {
    // Stale files from a previous job must not leak into this one.
    match tokio::fs::remove_dir_all(upload_dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(AppError::InternalError(format!(
                "Failed to clear upload directory: {e}"
            )))
        }
    }
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload directory: {e}")))?;

    for file in files {
        write_upload(upload_dir, file).await?;
    }
    write_upload(upload_dir, module_config).await
}

/// Persist one uploaded file under the upload directory, preserving any
/// relative path structure in its name.
async fn write_upload(upload_dir: &Path, file: &FilePayload) -> AppResult<PathBuf> {
    let dest = safe_join(upload_dir, &file.file_name).ok_or_else(|| {
        AppError::BadRequest(format!("Illegal file name: {}", file.file_name))
    })?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
    }
    tokio::fs::write(&dest, &file.bytes)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(dest)
}

/// Join a client-supplied relative path onto `dir`, rejecting absolute
/// paths and any `..` component so an upload can never escape the staging
/// directory.
fn safe_join(dir: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let mut clean = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        return None;
    }
    Some(dir.join(clean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_join_accepts_plain_and_nested_names() {
        let dir = Path::new("staging");
        assert_eq!(
            safe_join(dir, "a.docx"),
            Some(PathBuf::from("staging/a.docx"))
        );
        assert_eq!(
            safe_join(dir, "batch/a.docx"),
            Some(PathBuf::from("staging/batch/a.docx"))
        );
    }

    #[test]
    fn safe_join_rejects_escapes() {
        let dir = Path::new("staging");
        assert!(safe_join(dir, "../evil.docx").is_none());
        assert!(safe_join(dir, "a/../../evil.docx").is_none());
        assert!(safe_join(dir, "/etc/passwd").is_none());
        assert!(safe_join(dir, "").is_none());
    }
}
