use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use docfuse_api::config::ServerConfig;
use docfuse_api::routes;
use docfuse_api::state::AppState;
use docfuse_api::ws::WsManager;
use docfuse_core::guard::SubmissionGuard;
use docfuse_events::EventBus;
use docfuse_pipeline::{DocumentMerger, MergeJobSpec, ProgressReporter};

/// Merge stand-in that reports one progress step, writes a fixed result
/// file, and returns its path.
pub struct InstantMerger;

#[async_trait::async_trait]
impl DocumentMerger for InstantMerger {
    async fn merge(
        &self,
        spec: &MergeJobSpec,
        progress: Arc<ProgressReporter>,
    ) -> anyhow::Result<PathBuf> {
        progress.update(Some(50.0), Some("Merging"), None);
        let path = spec.output_dir.join("merged.docx");
        tokio::fs::write(&path, b"merged-result").await?;
        Ok(path)
    }
}

/// Build a test `ServerConfig` rooted in a temporary directory.
pub fn test_config(root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 16 * 1024 * 1024,
        upload_dir: root.join("uploaded_input"),
        output_dir: root.join("default_output"),
        merge_command: "docfuse-merge".to_string(),
    }
}

/// Build shared state with the given merger and temp-dir-rooted config.
pub fn test_state(root: &std::path::Path, merger: Arc<dyn DocumentMerger>) -> AppState {
    std::fs::create_dir_all(root.join("default_output")).expect("create output dir");
    AppState {
        config: Arc::new(test_config(root)),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(EventBus::default()),
        job_guard: Arc::new(SubmissionGuard::new()),
        merger,
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::app_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Perform a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// One field of a hand-assembled multipart body.
pub enum MultipartField<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

/// Boundary used by [`multipart_request`].
const BOUNDARY: &str = "docfuse-test-boundary";

/// Assemble a `POST` multipart request from the given fields.
pub fn multipart_request(uri: &str, fields: &[MultipartField<'_>]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for field in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match field {
            MultipartField::File {
                name,
                file_name,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
            MultipartField::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
