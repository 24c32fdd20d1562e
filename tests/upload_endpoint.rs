mod common;

use axum::body::Bytes;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
use axum::http::{HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use cloud_upload::common::messages::{
    UploadResult, INTERNAL_ERROR_MESSAGE, NO_FILE_MESSAGE, UPLOAD_SUCCESS_MESSAGE,
    UPSTREAM_FAILURE_MESSAGE, UPSTREAM_TIMEOUT_MESSAGE,
};
use cloud_upload::media_host::MediaHost;
use cloud_upload::server::{build_router, AppState};
use common::{app_state, dir_is_empty, png_bytes, Behavior, RecordingHost};

fn server(state: AppState) -> TestServer {
    TestServer::new(build_router(state)).unwrap()
}

fn image_form(bytes: Vec<u8>, file_name: &str, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part("image", Part::bytes(bytes).file_name(file_name).mime_type(mime))
}

#[tokio::test]
async fn test_liveness() {
    let dir = tempfile::tempdir().unwrap();
    let app = server(app_state(RecordingHost::new(Behavior::Unique), dir.path()));

    let response = app.get("/").await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.text(), "I am live");
}

#[tokio::test]
async fn test_missing_image_field_is_400_without_upload() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Unique);
    let app = server(app_state(host.clone(), dir.path()));

    let response = app
        .post("/upload")
        .multipart(MultipartForm::new().add_text("caption", "no picture here"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "success": false, "message": NO_FILE_MESSAGE }));
    assert_eq!(host.calls(), 0);
}

#[tokio::test]
async fn test_non_multipart_body_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Unique);
    let app = server(app_state(host.clone(), dir.path()));

    let response = app.post("/upload").json(&json!({ "image": "nope" })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: UploadResult = response.json();
    assert_eq!(body, UploadResult::failure(NO_FILE_MESSAGE));
    assert_eq!(host.calls(), 0);
}

#[tokio::test]
async fn test_truncated_multipart_is_400_without_upload() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Unique);
    let app = server(app_state(host.clone(), dir.path()));

    // image part starts but neither the part nor the closing boundary ever ends
    let body = Bytes::from_static(
        b"--XYZ\r\n\
Content-Disposition: form-data; name=\"image\"; filename=\"a.png\"\r\n\
Content-Type: image/png\r\n\r\n\
\x89PNG\r\n",
    );
    let response = app
        .post("/upload")
        .bytes(body)
        .content_type("multipart/form-data; boundary=XYZ")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "success": false, "message": "Malformed multipart request" }));
    assert_eq!(host.calls(), 0);
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let dir = tempfile::tempdir().unwrap();
    let app = server(app_state(RecordingHost::new(Behavior::Unique), dir.path()));

    let response = app
        .get("/")
        .add_header(ORIGIN, HeaderValue::from_static("http://localhost:5173"))
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&HeaderValue::from_static("*"))
    );
}

#[tokio::test]
async fn test_successful_upload_returns_url_and_removes_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::fixed("https://x/y.png", "abc123");
    let app = server(app_state(host.clone(), dir.path()));

    let response = app
        .post("/upload")
        .multipart(image_form(png_bytes(), "y.png", "image/png"))
        .await;

    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({
        "success": true,
        "message": UPLOAD_SUCCESS_MESSAGE,
        "url": "https://x/y.png",
        "public_id": "abc123"
    }));

    let seen = host.seen();
    assert_eq!(seen.len(), 1);
    let (path, existed_during_upload, filename) = &seen[0];
    assert!(existed_during_upload);
    assert!(path.starts_with(dir.path()));
    assert_eq!(filename.as_deref(), Some("y.png"));
    assert!(!path.exists());
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_failed_upload_is_500_and_removes_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Fail);
    let app = server(app_state(host.clone(), dir.path()));

    let response = app
        .post("/upload")
        .multipart(image_form(png_bytes(), "y.png", "image/png"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "success": false, "message": UPSTREAM_FAILURE_MESSAGE }));
    assert_eq!(host.calls(), 1);
    assert!(host.seen()[0].1);
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_same_upload_twice_gets_two_ids() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Unique);
    let app = server(app_state(host.clone(), dir.path()));

    let first: UploadResult = app
        .post("/upload")
        .multipart(image_form(png_bytes(), "same.png", "image/png"))
        .await
        .json();
    let second: UploadResult = app
        .post("/upload")
        .multipart(image_form(png_bytes(), "same.png", "image/png"))
        .await
        .json();

    assert!(first.success && second.success);
    assert_ne!(first.public_id, second.public_id);
    assert_eq!(host.calls(), 2);
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_declared_non_image_is_rejected_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Unique);
    let app = server(app_state(host.clone(), dir.path()));

    let response = app
        .post("/upload")
        .multipart(image_form(b"%PDF-1.7".to_vec(), "doc.pdf", "application/pdf"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "success": false, "message": NO_FILE_MESSAGE }));
    assert_eq!(host.calls(), 0);
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_disguised_non_image_is_rejected_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Unique);
    let app = server(app_state(host.clone(), dir.path()));

    let response = app
        .post("/upload")
        .multipart(image_form(b"#!/bin/sh\necho hi\n".to_vec(), "evil.png", "image/png"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(host.calls(), 0);
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_oversize_is_413_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Unique);
    let mut state = app_state(host.clone(), dir.path());
    state.max_file_bytes = 1024;
    let app = server(state);

    let mut payload = png_bytes();
    payload.resize(4096, 0);
    let response = app
        .post("/upload")
        .multipart(image_form(payload, "big.png", "image/png"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: UploadResult = response.json();
    assert!(!body.success);
    assert_eq!(body.message, "File exceeds the 1 KiB limit");
    assert_eq!(host.calls(), 0);
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_second_image_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Unique);
    let app = server(app_state(host.clone(), dir.path()));

    let form = MultipartForm::new()
        .add_part("image", Part::bytes(png_bytes()).file_name("a.png").mime_type("image/png"))
        .add_part("image", Part::bytes(png_bytes()).file_name("b.png").mime_type("image/png"));
    let response = app.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "success": false, "message": "Unexpected field" }));
    assert_eq!(host.calls(), 0);
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_file_under_other_field_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Unique);
    let app = server(app_state(host.clone(), dir.path()));

    let form = MultipartForm::new()
        .add_part("avatar", Part::bytes(png_bytes()).file_name("a.png").mime_type("image/png"));
    let response = app.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(host.calls(), 0);
}

#[tokio::test]
async fn test_hung_host_hits_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let host = RecordingHost::new(Behavior::Hang);
    let mut state = app_state(host.clone(), dir.path());
    state.upload_timeout = Duration::from_millis(50);
    let app = server(state);

    let response = app
        .post("/upload")
        .multipart(image_form(png_bytes(), "slow.png", "image/png"))
        .await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    response.assert_json(&json!({ "success": false, "message": UPSTREAM_TIMEOUT_MESSAGE }));
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_panic_is_caught_at_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let host: Arc<dyn MediaHost> = RecordingHost::new(Behavior::Panic);
    let app = server(app_state(host, dir.path()));

    let response = app
        .post("/upload")
        .multipart(image_form(png_bytes(), "boom.png", "image/png"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "success": false, "message": INTERNAL_ERROR_MESSAGE }));
    assert!(dir_is_empty(dir.path()));
}
