//! Authoritative progress state for a running merge job.
//!
//! The reporter owns the percent, the current step, and the full step
//! history. Every emission is a complete snapshot: clients replace their
//! view wholesale, so a subscriber that joins mid-job is correct after one
//! message. A ticker task re-publishes the current snapshot once per second
//! so the elapsed clocks advance between real progress updates.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use docfuse_core::progress::format_hms;
use docfuse_core::push::{HistoryEntry, ProgressUpdate, PushMessage};
use docfuse_events::EventBus;
use tokio_util::sync::CancellationToken;

/// Interval between ticker re-publications.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// One finished step, with its duration in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub name: String,
    pub seconds: u64,
}

struct ReporterState {
    percent: Option<f64>,
    step_name: Option<String>,
    step_started: Option<Instant>,
    history: Vec<StepRecord>,
    total_started: Instant,
}

/// Tracks and broadcasts the progress of the single running job.
pub struct ProgressReporter {
    state: Mutex<ReporterState>,
    bus: Arc<EventBus>,
}

impl ProgressReporter {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            state: Mutex::new(ReporterState {
                percent: Some(0.0),
                step_name: None,
                step_started: None,
                history: Vec::new(),
                total_started: Instant::now(),
            }),
            bus,
        }
    }

    /// Record a progress update from the merge job and broadcast the
    /// resulting snapshot.
    ///
    /// A step name different from the current one restarts the per-step
    /// clock. `history`, when given, replaces the stored list: the job is
    /// the source of truth for the complete list, never a delta.
    pub fn update(
        &self,
        percent: Option<f64>,
        step_name: Option<&str>,
        history: Option<Vec<StepRecord>>,
    ) {
        {
            let mut state = self.state.lock().expect("reporter state poisoned");
            if let Some(name) = step_name {
                if state.step_name.as_deref() != Some(name) {
                    state.step_name = Some(name.to_string());
                    state.step_started = Some(Instant::now());
                }
            }
            state.percent = percent;
            if let Some(history) = history {
                state.history = history;
            }
        }
        self.publish_snapshot();
    }

    /// Build the current full snapshot.
    pub fn snapshot(&self) -> ProgressUpdate {
        let state = self.state.lock().expect("reporter state poisoned");
        let step_elapsed = state
            .step_started
            .map(|started| started.elapsed().as_secs())
            .unwrap_or(0);

        ProgressUpdate {
            percent: state.percent,
            current_step_name: state.step_name.clone(),
            current_step_elapsed: Some(format_hms(step_elapsed)),
            total_elapsed: Some(format_hms(state.total_started.elapsed().as_secs())),
            history: state
                .history
                .iter()
                .map(|step| HistoryEntry {
                    name: step.name.clone(),
                    time: format_hms(step.seconds),
                })
                .collect(),
            status: None,
            message: None,
        }
    }

    /// Broadcast the current snapshot unchanged.
    pub fn publish_snapshot(&self) {
        self.bus.publish(PushMessage::ProgressUpdate(self.snapshot()));
    }

    /// Spawn the once-per-second re-publication task.
    ///
    /// Runs until `cancel` is triggered. The runner cancels it before
    /// emitting the terminal events so a stale tick can never follow them.
    pub fn start_ticker(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            // The first tick fires immediately; skip it, update() already
            // published the initial snapshot.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("Progress ticker stopped");
                        return;
                    }
                    _ = interval.tick() => {
                        self.publish_snapshot();
                    }
                }
            }
        })
    }
}
