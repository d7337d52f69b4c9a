//! Submission orchestration: session bookkeeping around one HTTP call.
//!
//! The guard is taken and the request fully prepared under the session
//! lock before any asynchronous work starts; the lock is not held across
//! the await, and the outcome is applied under the lock afterwards. No
//! interleaving of two `submit` calls can therefore both observe the
//! guard unset.

use std::sync::Mutex;

use crate::api::{MergeApi, SubmitOutcome};
use crate::session::{MergeSession, SubmitRejection};

/// Why a submission did not leave the job running.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Rejected locally before any request was issued.
    #[error(transparent)]
    Rejected(#[from] SubmitRejection),

    /// The request was issued but the job did not start; the session has
    /// been reverted to `Idle` and the message surfaced.
    #[error("{0}")]
    Failed(String),
}

/// Perform one submission attempt.
///
/// On success the session is `Running` and the caller should watch the
/// push channel for progress. On failure the session is back in `Idle`
/// with the error recorded; resubmission is allowed, nothing retries
/// automatically.
pub async fn submit(
    session: &Mutex<MergeSession>,
    api: &MergeApi,
    days: u32,
) -> Result<(), SubmitError> {
    let prepared = {
        let mut session = session.lock().expect("session lock poisoned");
        session.begin_submission(days)?
    };

    tracing::info!(
        files = prepared.files.len(),
        config = %prepared.config.file_name,
        days = prepared.days,
        "Submitting merge job",
    );

    let result = api
        .start_merge(&prepared.files, &prepared.config, prepared.days)
        .await;

    let mut session = session.lock().expect("session lock poisoned");
    match result {
        Ok(SubmitOutcome::Accepted) => {
            session.submission_accepted();
            Ok(())
        }
        Ok(SubmitOutcome::Rejected(message)) => {
            session.submission_failed(message.clone());
            Err(SubmitError::Failed(message))
        }
        Err(e) => {
            let message = e.to_string();
            session.submission_failed(message.clone());
            Err(SubmitError::Failed(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfuse_core::job_state::JobState;
    use docfuse_core::upload::FilePayload;

    fn ready_session() -> Mutex<MergeSession> {
        let mut session = MergeSession::new();
        session.add_document(FilePayload::new("a.docx", b"a".to_vec()));
        session.select_config_file("cfg.json", br#"{"module_titles":["Intro"]}"#.to_vec());
        Mutex::new(session)
    }

    #[tokio::test]
    async fn local_rejection_issues_no_request() {
        let session = Mutex::new(MergeSession::new());
        // Unroutable endpoint: a request would fail loudly if one were made,
        // but the empty batch must reject before that.
        let api = MergeApi::new("http://127.0.0.1:1");

        let err = submit(&session, &api, 5).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Rejected(SubmitRejection::EmptyBatch)
        ));
        assert_eq!(session.lock().unwrap().state(), JobState::Idle);
    }

    #[tokio::test]
    async fn transport_failure_reverts_the_session() {
        let session = ready_session();
        let api = MergeApi::new("http://127.0.0.1:1");

        let err = submit(&session, &api, 5).await.unwrap_err();
        assert!(matches!(err, SubmitError::Failed(_)));

        let session = session.lock().unwrap();
        assert_eq!(session.state(), JobState::Idle);
        assert!(session.last_error().is_some());
        assert!(!session.is_submitting_or_running());
    }
}
