//! The client-side merge session.
//!
//! One [`MergeSession`] owns all state the submitting side tracks: the
//! upload batch, the selected configuration (on-disk payload plus the
//! in-memory edited copy), the override intent, the single-submission
//! guard, the job state machine, and the progress view the UI renders.
//! Every reset point is explicit; there is no ambient shared state.

use docfuse_core::config_override::resolve_effective_config;
use docfuse_core::guard::SubmissionGuard;
use docfuse_core::job_state::JobState;
use docfuse_core::module_config::ModuleConfig;
use docfuse_core::progress::{PercentDisplay, ZERO_ELAPSED};
use docfuse_core::push::{HistoryEntry, ProcessDone, ProgressUpdate, PushMessage, TerminalStatus};
use docfuse_core::upload::{FilePayload, UploadBatch};

/// Why a submission attempt was rejected before any request was issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejection {
    #[error("Select at least one document to merge")]
    EmptyBatch,

    #[error("Select a module configuration file")]
    MissingConfig,

    /// The submission guard is already taken.
    #[error("A merge job is already in progress")]
    AlreadyRunning,
}

/// A submission the session has committed to: the guard is held and the
/// effective configuration payload has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSubmission {
    pub files: Vec<FilePayload>,
    pub config: FilePayload,
    pub days: u32,
}

/// Progress state as the UI renders it.
#[derive(Debug, Clone)]
pub struct ProgressDisplay {
    /// Whether the progress area is shown at all.
    pub visible: bool,
    pub percent: PercentDisplay,
    /// Name of the step currently executing; `None` renders a placeholder.
    pub current_step: Option<String>,
    pub step_elapsed: String,
    pub total_elapsed: String,
    /// Finished steps, replaced in full on every progress event.
    pub history: Vec<HistoryEntry>,
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self {
            visible: false,
            percent: PercentDisplay::default(),
            current_step: None,
            step_elapsed: ZERO_ELAPSED.to_string(),
            total_elapsed: ZERO_ELAPSED.to_string(),
            history: Vec::new(),
        }
    }
}

/// Client-side state for submitting merge jobs and tracking their progress.
#[derive(Debug, Default)]
pub struct MergeSession {
    batch: UploadBatch,
    on_disk_config: Option<FilePayload>,
    edited_config: Option<ModuleConfig>,
    config_file_name: Option<String>,
    use_edited_config: bool,
    guard: SubmissionGuard,
    state: JobState,
    progress: ProgressDisplay,
    download_url: Option<String>,
    last_error: Option<String>,
    last_notice: Option<String>,
}

impl MergeSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- read accessors for the rendering layer ----

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn progress(&self) -> &ProgressDisplay {
        &self.progress
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_notice(&self) -> Option<&str> {
        self.last_notice.as_deref()
    }

    pub fn documents(&self) -> &[FilePayload] {
        self.batch.files()
    }

    pub fn edited_config(&self) -> Option<&ModuleConfig> {
        self.edited_config.as_ref()
    }

    pub fn config_file_name(&self) -> Option<&str> {
        self.config_file_name.as_deref()
    }

    pub fn override_confirmed(&self) -> bool {
        self.use_edited_config
    }

    pub fn is_submitting_or_running(&self) -> bool {
        self.guard.is_active()
    }

    // ---- document batch ----

    pub fn add_document(&mut self, file: FilePayload) {
        self.batch.push(file);
    }

    /// Remove a document from the batch. Allowed until submission; the
    /// submitted snapshot is unaffected.
    pub fn remove_document(&mut self, idx: usize) -> Option<FilePayload> {
        self.batch.remove(idx)
    }

    pub fn clear_documents(&mut self) {
        self.batch.clear();
    }

    // ---- configuration selection & editing ----

    /// Select a configuration file from disk.
    ///
    /// Always replaces the edited copy with a fresh parse of the file and
    /// resets the override intent: a new on-disk selection is
    /// authoritative even if the user had previously confirmed an
    /// override. Malformed content recovers to an empty title list so the
    /// selection itself never fails.
    pub fn select_config_file(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) {
        let file_name = file_name.into();
        self.edited_config = Some(ModuleConfig::parse_lenient(&bytes));
        self.on_disk_config = Some(FilePayload::new(file_name.clone(), bytes));
        self.config_file_name = Some(file_name);
        self.use_edited_config = false;
    }

    /// Clear the configuration selection entirely.
    pub fn clear_config_selection(&mut self) {
        self.on_disk_config = None;
        self.edited_config = None;
        self.config_file_name = None;
        self.use_edited_config = false;
    }

    /// Confirm the intent to submit the edited copy instead of the on-disk
    /// file. Only meaningful while an edited copy exists.
    pub fn confirm_override(&mut self) -> bool {
        if self.edited_config.is_some() {
            self.use_edited_config = true;
            true
        } else {
            false
        }
    }

    pub fn add_module_title(&mut self, title: impl Into<String>) -> bool {
        match self.edited_config.as_mut() {
            Some(config) => {
                config.add_title(title);
                true
            }
            None => false,
        }
    }

    pub fn rename_module_title(&mut self, idx: usize, title: impl Into<String>) -> bool {
        self.edited_config
            .as_mut()
            .is_some_and(|config| config.rename_title(idx, title))
    }

    pub fn remove_module_title(&mut self, idx: usize) -> bool {
        self.edited_config
            .as_mut()
            .is_some_and(|config| config.remove_title(idx))
    }

    // ---- submission ----

    /// Validate and commit to a submission attempt.
    ///
    /// Takes the guard first: a second attempt while one is in flight is
    /// rejected without touching anything else. Validation failures
    /// release the guard again, leaving no state change behind. On success
    /// the session is `Submitting`, the progress view is reset to its
    /// baseline, and any previous download reference is cleared.
    ///
    /// The effective configuration payload is resolved fresh on every
    /// call: both the override intent and the edited copy may have changed
    /// since the last attempt.
    pub fn begin_submission(&mut self, days: u32) -> Result<PreparedSubmission, SubmitRejection> {
        if !self.guard.try_acquire() {
            return Err(SubmitRejection::AlreadyRunning);
        }

        if self.batch.is_empty() {
            self.guard.release();
            return Err(SubmitRejection::EmptyBatch);
        }
        let on_disk = match self.on_disk_config.as_ref() {
            Some(payload) => payload,
            None => {
                self.guard.release();
                return Err(SubmitRejection::MissingConfig);
            }
        };

        let config = resolve_effective_config(
            self.use_edited_config,
            self.edited_config.as_ref(),
            self.config_file_name.as_deref(),
            on_disk,
        );

        self.transition(JobState::Submitting);
        self.progress = ProgressDisplay {
            visible: true,
            ..ProgressDisplay::default()
        };
        self.download_url = None;
        self.last_error = None;
        self.last_notice = None;

        Ok(PreparedSubmission {
            files: self.batch.files().to_vec(),
            config,
            days,
        })
    }

    /// The submission request was accepted: the job is running and
    /// progress events are expected. Acceptance does not release the
    /// guard; it only means the job started, not that it finished.
    pub fn submission_accepted(&mut self) {
        self.transition(JobState::Running);
    }

    /// The submission request failed (transport failure or an explicit
    /// error response). Releases the guard, surfaces the message, and
    /// returns to a resubmittable state. No automatic retry.
    pub fn submission_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, "Submission failed");
        self.guard.release();
        self.progress.visible = false;
        self.last_error = Some(message);
        self.transition(JobState::Idle);
    }

    // ---- push-channel events ----

    /// Apply one push-channel message to the session.
    ///
    /// Messages arrive in server emission order; each one is a full,
    /// authoritative snapshot.
    pub fn handle_push(&mut self, message: PushMessage) {
        match message {
            PushMessage::ProgressUpdate(update) => self.apply_progress(update),
            PushMessage::ProcessDone(done) => self.apply_completion(done),
        }
    }

    fn apply_progress(&mut self, update: ProgressUpdate) {
        self.progress.percent = PercentDisplay::from_percent(update.percent);
        self.progress.current_step = update.current_step_name;
        self.progress.step_elapsed = update
            .current_step_elapsed
            .unwrap_or_else(|| ZERO_ELAPSED.to_string());
        self.progress.total_elapsed = update
            .total_elapsed
            .unwrap_or_else(|| ZERO_ELAPSED.to_string());
        // Full replace: the server owns the complete history.
        self.progress.history = update.history;

        match update.status {
            Some(TerminalStatus::Done) => {
                self.finish_job(JobState::Done);
            }
            Some(TerminalStatus::Error) => {
                self.last_error = Some(
                    update
                        .message
                        .unwrap_or_else(|| "Unknown processing error".to_string()),
                );
                self.finish_job(JobState::Error);
            }
            None => {}
        }
    }

    /// Handle the one-time completion event carrying the artifact
    /// reference. May arrive with or without a preceding terminal progress
    /// marker; both orders leave the session in the same resubmittable
    /// state.
    fn apply_completion(&mut self, done: ProcessDone) {
        match done.download_url {
            Some(url) => {
                tracing::info!(download_url = %url, "Merge result available");
                self.download_url = Some(url);
            }
            None => {
                self.last_notice =
                    Some("Processing completed, but no downloadable result was produced".into());
            }
        }
        self.finish_job(JobState::Done);
    }

    /// Terminal handling shared by the done/error markers and the
    /// completion event: release the guard, hide the progress display, and
    /// collapse the terminal state back to `Idle` now that its one-time
    /// side effects are recorded.
    fn finish_job(&mut self, terminal: JobState) {
        self.guard.release();
        self.progress.visible = false;
        self.transition(terminal);
        self.transition(JobState::Idle);
    }

    fn transition(&mut self, next: JobState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "Job state transition");
            self.state = next;
        }
    }
}
