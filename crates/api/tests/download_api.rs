//! Integration tests for the result download endpoint.

mod common;

use std::sync::Arc;

use axum::http::{header, StatusCode};
use common::{body_json, get, InstantMerger};
use http_body_util::BodyExt;

fn encode_path(path: &std::path::Path) -> String {
    url::form_urlencoded::byte_serialize(path.to_string_lossy().as_bytes()).collect()
}

// ---------------------------------------------------------------------------
// Test: a file under the output directory downloads as an attachment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn result_file_downloads_as_attachment() {
    let tmp = tempfile::tempdir().unwrap();
    let state = common::test_state(tmp.path(), Arc::new(InstantMerger));
    let app = common::build_test_app(state.clone());

    let result_path = state.config.output_dir.join("merged.docx");
    tokio::fs::write(&result_path, b"merged-result").await.unwrap();

    let uri = format!("/download?file_path={}", encode_path(&result_path));
    let response = get(app, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .expect("attachment header present")
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"merged_"));
    assert!(disposition.ends_with(".docx\""));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"merged-result");
}

// ---------------------------------------------------------------------------
// Test: paths outside the output directory are forbidden
// ---------------------------------------------------------------------------

#[tokio::test]
async fn path_outside_output_dir_is_forbidden() {
    let tmp = tempfile::tempdir().unwrap();
    let state = common::test_state(tmp.path(), Arc::new(InstantMerger));
    let app = common::build_test_app(state.clone());

    // A real file, but outside the output directory.
    let outside = tmp.path().join("secret.txt");
    tokio::fs::write(&outside, b"secret").await.unwrap();

    let uri = format!("/download?file_path={}", encode_path(&outside));
    let response = get(app, &uri).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
}

// ---------------------------------------------------------------------------
// Test: missing files produce 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_result_file_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let state = common::test_state(tmp.path(), Arc::new(InstantMerger));
    let app = common::build_test_app(state.clone());

    let gone = state.config.output_dir.join("never-existed.docx");
    let uri = format!("/download?file_path={}", encode_path(&gone));
    let response = get(app, &uri).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
}

// ---------------------------------------------------------------------------
// Test: an empty file_path parameter is a bad request
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_file_path_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let state = common::test_state(tmp.path(), Arc::new(InstantMerger));
    let app = common::build_test_app(state.clone());

    let response = get(app, "/download?file_path=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
