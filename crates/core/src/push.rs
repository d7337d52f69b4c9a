//! Push-channel wire messages.
//!
//! The server pushes JSON messages of the shape `{"type": "<kind>", ...}`
//! over the WebSocket channel. This module defines the typed forms used by
//! both sides: the server serializes them, the client parses them.
//!
//! Events carry no job identifier: the protocol supports a single logical
//! job stream at a time, and each progress event is a full, authoritative
//! snapshot (the history list replaces the previous one wholesale, it is
//! never a delta).

use serde::{Deserialize, Serialize};

/// Terminal marker carried on a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalStatus {
    Done,
    Error,
}

/// One finished step in the job history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Step name, rendered as-is.
    pub name: String,
    /// Step duration as an opaque `HH:MM:SS` display string.
    pub time: String,
}

/// Full progress snapshot for the currently running job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Completion percentage. Absent or non-finite means the current step
    /// finished without a known sub-progress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step_name: Option<String>,

    /// Elapsed time of the current step, opaque display string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step_elapsed: Option<String>,

    /// Elapsed time of the whole job, opaque display string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_elapsed: Option<String>,

    /// Complete list of finished steps, in the order the server emitted
    /// them. Replaces any previously displayed history.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    /// Present only on the final event of a job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TerminalStatus>,

    /// Human-readable error description, carried with `status: "error"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Final artifact notification, sent once when the job has produced (or
/// failed to produce) a downloadable result.
///
/// Not mutually exclusive with a terminal progress marker: consumers must
/// tolerate receiving this with or without having seen `status: "done"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessDone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// All push-channel message types, tagged by the `"type"` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PushMessage {
    #[serde(rename = "progress_update")]
    ProgressUpdate(ProgressUpdate),

    #[serde(rename = "process_done")]
    ProcessDone(ProcessDone),
}

/// Parse a push-channel text frame into a typed message.
///
/// Returns `Err` for malformed JSON or unknown `type` values. Callers
/// should log unknown frames and continue consuming the channel.
pub fn parse_push_message(text: &str) -> Result<PushMessage, serde_json::Error> {
    serde_json::from_str(text)
}
