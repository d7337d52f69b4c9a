//! Merge-job execution harness.
//!
//! The document-merge algorithm itself is an external collaborator behind
//! the [`merger::DocumentMerger`] trait. This crate supplies everything
//! around it: the progress reporter with its once-per-second ticker, the
//! job runner that emits the terminal events, and a subprocess-backed
//! merger implementation.

pub mod merger;
pub mod reporter;
pub mod runner;

pub use merger::{CommandMerger, DocumentMerger, MergeJobSpec};
pub use reporter::{ProgressReporter, StepRecord};
pub use runner::run_merge_job;
