//! HTTP client for the merge service submission endpoint.
//!
//! Wraps the `POST /start` multipart request using [`reqwest`] and
//! interprets the status-discriminator response body.

use docfuse_core::upload::FilePayload;
use serde::Deserialize;

/// HTTP client for one merge service instance.
pub struct MergeApi {
    client: reqwest::Client,
    base_url: String,
}

/// Structured result of the submission endpoint.
#[derive(Debug, Deserialize)]
struct StartResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Immediate outcome of a submission request.
///
/// `Accepted` only means the job was accepted: completion is signalled
/// later over the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// The server rejected the submission; carries its message verbatim.
    Rejected(String),
}

/// Errors from the submission HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum MergeApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with something that is not a status-discriminator
    /// body.
    #[error("Unexpected response ({status}): {body}")]
    Unexpected {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl MergeApi {
    /// Create a new client.
    ///
    /// * `base_url` - HTTP base URL, e.g. `http://host:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a merge job.
    ///
    /// Sends the document batch as repeated `files` parts, the effective
    /// configuration payload as the single `module_config` part, and the
    /// scalar `days` field. Any non-transport failure is reported through
    /// the discriminator in the body, whatever the HTTP status.
    pub async fn start_merge(
        &self,
        files: &[FilePayload],
        config: &FilePayload,
        days: u32,
    ) -> Result<SubmitOutcome, MergeApiError> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            form = form.part(
                "files",
                reqwest::multipart::Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone()),
            );
        }
        form = form.part(
            "module_config",
            reqwest::multipart::Part::bytes(config.bytes.clone())
                .file_name(config.file_name.clone()),
        );
        form = form.text("days", days.to_string());

        let response = self
            .client
            .post(format!("{}/start", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        interpret_start_body(status, &body)
    }
}

/// Interpret a submission response body.
///
/// The discriminator decides the outcome; the HTTP status only matters
/// when the body is not parseable.
fn interpret_start_body(status: u16, body: &str) -> Result<SubmitOutcome, MergeApiError> {
    match serde_json::from_str::<StartResponse>(body) {
        Ok(parsed) if parsed.status == "started" => Ok(SubmitOutcome::Accepted),
        Ok(parsed) => Ok(SubmitOutcome::Rejected(parsed.message.unwrap_or_else(
            || format!("Submission rejected with status '{}'", parsed.status),
        ))),
        Err(_) => Err(MergeApiError::Unexpected {
            status,
            body: body.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_body_is_accepted() {
        let outcome = interpret_start_body(200, r#"{"status":"started"}"#).unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted);
    }

    #[test]
    fn error_body_carries_message_verbatim() {
        let outcome =
            interpret_start_body(400, r#"{"status":"error","message":"invalid days value"}"#)
                .unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected("invalid days value".into()));
    }

    #[test]
    fn error_body_without_message_gets_a_fallback() {
        let outcome = interpret_start_body(500, r#"{"status":"error"}"#).unwrap();
        match outcome {
            SubmitOutcome::Rejected(msg) => assert!(msg.contains("error")),
            other => panic!("Expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_body_is_an_unexpected_response() {
        let err = interpret_start_body(502, "<html>Bad Gateway</html>").unwrap_err();
        match err {
            MergeApiError::Unexpected { status, .. } => assert_eq!(status, 502),
            other => panic!("Expected Unexpected, got {other:?}"),
        }
    }
}
