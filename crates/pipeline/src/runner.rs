//! End-to-end execution of one merge job.
//!
//! Wires a [`DocumentMerger`] to a [`ProgressReporter`], runs the job, and
//! emits the terminal events: a final `progress_update` carrying the
//! terminal marker, plus (on success) the separate `process_done` message
//! with the download link. Consumers must tolerate receiving either one
//! first, so both are always emitted on success.

use std::path::Path;
use std::sync::Arc;

use docfuse_core::push::{ProcessDone, PushMessage, TerminalStatus};
use docfuse_events::EventBus;
use tokio_util::sync::CancellationToken;

use crate::merger::{is_under_dir, DocumentMerger, MergeJobSpec};
use crate::reporter::ProgressReporter;

/// Run one merge job to completion and broadcast its lifecycle.
///
/// Never returns an error: every failure is converted into an error-marked
/// progress event so the submitting side always observes a terminal event.
pub async fn run_merge_job(merger: Arc<dyn DocumentMerger>, spec: MergeJobSpec, bus: Arc<EventBus>) {
    let reporter = Arc::new(ProgressReporter::new(Arc::clone(&bus)));
    let ticker_cancel = CancellationToken::new();
    let ticker = Arc::clone(&reporter).start_ticker(ticker_cancel.clone());

    let result = merger.merge(&spec, Arc::clone(&reporter)).await;

    // Stop the clock before the terminal events so no stale tick can
    // follow them.
    ticker_cancel.cancel();
    let _ = ticker.await;

    match result {
        // A misbehaving merge command could hand back an arbitrary path;
        // only results under the output directory are ever linked.
        Ok(output_path) if !is_under_dir(&output_path, &spec.output_dir) => {
            tracing::error!(
                output = %output_path.display(),
                output_dir = %spec.output_dir.display(),
                "Merge returned a path outside the output directory",
            );
            let mut terminal = reporter.snapshot();
            terminal.status = Some(TerminalStatus::Error);
            terminal.message =
                Some("Merge produced a result outside the output directory".to_string());
            bus.publish(PushMessage::ProgressUpdate(terminal));
        }
        Ok(output_path) => {
            let mut terminal = reporter.snapshot();
            terminal.percent = Some(100.0);
            terminal.status = Some(TerminalStatus::Done);
            bus.publish(PushMessage::ProgressUpdate(terminal));

            let download_url = download_url_for(&output_path);
            tracing::info!(%download_url, "Merge job completed");
            bus.publish(PushMessage::ProcessDone(ProcessDone {
                download_url: Some(download_url),
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "Merge job failed");
            let mut terminal = reporter.snapshot();
            terminal.status = Some(TerminalStatus::Error);
            terminal.message = Some(e.to_string());
            bus.publish(PushMessage::ProgressUpdate(terminal));
        }
    }
}

/// Build the relative download link for a produced output file, with the
/// path carried as an url-encoded query value.
pub fn download_url_for(path: &Path) -> String {
    let encoded: String =
        url::form_urlencoded::byte_serialize(path.to_string_lossy().as_bytes()).collect();
    format!("/download?file_path={encoded}")
}
