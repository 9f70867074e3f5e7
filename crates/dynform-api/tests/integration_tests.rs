//! # Integration Tests for dynform-api
//!
//! Drives the full router through `tower::ServiceExt::oneshot`: schema upload
//! and persistence, submission outcomes (accepted, field errors, duplicate,
//! no schema), listing, deletion, statistics, probes and the OpenAPI spec.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use dynform_api::state::{AppConfig, AppState};
use dynform_api::store::SubmissionStore;
use dynform_schema::EXAMPLE_FORM_JSON;
use dynform_validate::Locale;

/// Helper: build state whose schema file lives in a fresh temp dir.
fn test_state(locale: Locale) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        schema_dir: dir.path().to_path_buf(),
        locale,
        ..AppConfig::default()
    };
    (
        AppState::with_config(config, SubmissionStore::in_memory()),
        dir,
    )
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

async fn send(state: &AppState, request: Request<Body>) -> axum::http::Response<Body> {
    dynform_api::app(state.clone())
        .oneshot(request)
        .await
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn upload_example(state: &AppState) {
    let response = send(state, post_json("/forms/upload-schema", EXAMPLE_FORM_JSON)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

fn valid_data() -> Value {
    json!({
        "full_name": "Dana Levi",
        "email": "dana@example.com",
        "password": "Secret123!",
        "birth_date": "1990-05-15",
        "age": "30",
        "country": "israel"
    })
}

async fn submit(state: &AppState, data: Value) -> axum::http::Response<Body> {
    send(
        state,
        post_json("/forms/submit", json!({ "data": data }).to_string()),
    )
    .await
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let (state, _dir) = test_state(Locale::English);
    let response = send(&state, get("/health/liveness")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let (state, _dir) = test_state(Locale::English);
    let response = send(&state, get("/health/readiness")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Schema management --------------------------------------------------------

#[tokio::test]
async fn test_upload_schema_activates_and_persists() {
    let (state, dir) = test_state(Locale::English);
    let response = send(&state, post_json("/forms/upload-schema", EXAMPLE_FORM_JSON)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "File saved successfully");
    assert_eq!(body["version"], 1);
    assert_eq!(body["schema"]["title"], "Customer Registration");
    assert!(body["form_id"].is_string());
    assert!(dir.path().join("current_form.json").exists());
}

#[tokio::test]
async fn test_upload_malformed_json_reports_position() {
    let (state, _dir) = test_state(Locale::English);
    let response = send(
        &state,
        post_json("/forms/upload-schema", "{\n  \"title\": \"X\",\n  \"fields\": [\n"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_SCHEMA");
    assert!(body["error"]["details"]["line"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_upload_wrong_shape_reports_pointer() {
    let (state, _dir) = test_state(Locale::English);
    let doc = json!({"title": "X", "fields": [{"name": "a", "label": "A", "type": 42}]});
    let response = send(&state, post_json("/forms/upload-schema", doc.to_string())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_SCHEMA");
    let pointers: Vec<&str> = body["error"]["details"]["violations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v["pointer"].as_str())
        .collect();
    assert!(pointers.iter().any(|p| p.starts_with("/fields/0")));
}

#[tokio::test]
async fn test_upload_unsupported_type_is_rejected_and_not_persisted() {
    let (state, dir) = test_state(Locale::English);
    let doc = json!({"title": "X", "fields": [{"name": "a", "label": "A", "type": "color"}]});
    let response = send(&state, post_json("/forms/upload-schema", doc.to_string())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!dir.path().join("current_form.json").exists());

    let response = send(&state, get("/forms/current-form-id")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_current_schema_404_without_upload() {
    let (state, _dir) = test_state(Locale::English);
    let response = send(&state, get("/forms/current-schema")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_current_schema_returns_uploaded_document() {
    let (state, _dir) = test_state(Locale::English);
    upload_example(&state).await;
    let response = send(&state, get("/forms/current-schema")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["fields"].as_array().unwrap().len(), 6);
    assert_eq!(body["fields"][0]["type"], "text");
}

#[tokio::test]
async fn test_load_schema_reactivates_persisted_file() {
    let (state, dir) = test_state(Locale::English);
    upload_example(&state).await;

    // A fresh process over the same directory.
    let config = AppConfig {
        schema_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    let restarted = AppState::with_config(config, SubmissionStore::in_memory());
    let response = send(&restarted, get("/forms/load-schema")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Schema loaded successfully");
    assert_eq!(body["version"], 1);
}

#[tokio::test]
async fn test_load_schema_404_without_file() {
    let (state, _dir) = test_state(Locale::English);
    let response = send(&state, get("/forms/load-schema")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_current_form_id_tracks_version() {
    let (state, _dir) = test_state(Locale::English);
    upload_example(&state).await;
    upload_example(&state).await;
    let response = send(&state, get("/forms/current-form-id")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["version"], 2);
}

#[tokio::test]
async fn test_download_example_is_attachment() {
    let (state, _dir) = test_state(Locale::English);
    let response = send(&state, get("/forms/download-example")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("example_form.json"));
    let body = body_json(response).await;
    assert_eq!(body["title"], "Customer Registration");
}

// -- Submission ---------------------------------------------------------------

#[tokio::test]
async fn test_submit_without_schema_is_404() {
    let (state, _dir) = test_state(Locale::English);
    let response = submit(&state, valid_data()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_valid_data_is_stored_normalized() {
    let (state, _dir) = test_state(Locale::English);
    upload_example(&state).await;

    let response = submit(&state, valid_data()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Form submitted successfully");
    assert!(body.get("errors").is_none());

    let listed = body_json(send(&state, get("/submissions")).await).await;
    let rows = listed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["form_title"], "Customer Registration");
    assert_eq!(rows[0]["data"]["age"], 30.0);
    assert_eq!(rows[0]["data_hash"].as_str().unwrap().len(), 64);
    assert_eq!(
        rows[0]["fields_mapping"]["selected_options_labels"]["country"],
        "Israel"
    );
}

#[tokio::test]
async fn test_submit_field_errors_are_422() {
    let (state, _dir) = test_state(Locale::English);
    upload_example(&state).await;

    let mut data = valid_data();
    data["full_name"] = json!("D");
    data["age"] = json!(15);
    data["country"] = json!("france");
    data["birth_date"] = json!("15/05/1990");
    data.as_object_mut().unwrap().remove("email");

    let response = submit(&state, data).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Form has validation errors");
    let errors = &body["errors"];
    assert_eq!(errors["full_name"][0], "Name must be at least 2 characters");
    assert_eq!(errors["age"][0], "You must be at least 18");
    assert_eq!(errors["country"][0], "Please pick a listed country");
    assert_eq!(errors["birth_date"][0], "invalid date format, use YYYY-MM-DD");
    assert_eq!(errors["email"][0], "field is required");
    assert!(errors.get("password").is_none());

    let listed = body_json(send(&state, get("/submissions")).await).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_weak_password_fails_lookahead_pattern() {
    let (state, _dir) = test_state(Locale::English);
    upload_example(&state).await;

    let mut data = valid_data();
    data["password"] = json!("secret123!");
    let response = submit(&state, data).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"]["password"][0],
        "Password needs an uppercase letter, a lowercase letter and a digit"
    );
    assert_eq!(body["errors"].as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_submit_errors_render_in_hebrew() {
    let (state, _dir) = test_state(Locale::Hebrew);
    upload_example(&state).await;

    let mut data = valid_data();
    data.as_object_mut().unwrap().remove("email");
    let body = body_json(submit(&state, data).await).await;
    assert_eq!(body["errors"]["email"][0], "שדה חובה");
}

#[tokio::test]
async fn test_duplicate_submission_is_409() {
    let (state, _dir) = test_state(Locale::English);
    upload_example(&state).await;

    assert_eq!(submit(&state, valid_data()).await.status(), StatusCode::OK);

    // Same values, different key order and an ignored extra key.
    let reordered = json!({
        "country": "israel",
        "age": 30,
        "birth_date": "1990-05-15",
        "password": "Secret123!",
        "email": "dana@example.com",
        "full_name": "Dana Levi",
        "referrer": "newsletter"
    });
    let response = submit(&state, reordered).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"]["general"][0], "Identical form already submitted");
    assert_eq!(body["message"], "Identical form already submitted");

    let listed = body_json(send(&state, get("/submissions")).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_submit_malformed_body_is_400() {
    let (state, _dir) = test_state(Locale::English);
    upload_example(&state).await;
    let response = send(&state, post_json("/forms/submit", "{\"data\": 5}")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Submissions & statistics -------------------------------------------------

#[tokio::test]
async fn test_delete_submissions_clears_store() {
    let (state, _dir) = test_state(Locale::English);
    upload_example(&state).await;
    submit(&state, valid_data()).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/submissions")
        .body(Body::empty())
        .unwrap();
    let response = send(&state, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["deleted"], 1);

    // Deleting frees the fingerprint.
    assert_eq!(submit(&state, valid_data()).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_statistics_counts_per_form() {
    let (state, _dir) = test_state(Locale::English);
    upload_example(&state).await;
    submit(&state, valid_data()).await;
    let mut other = valid_data();
    other["email"] = json!("noa@example.com");
    submit(&state, other).await;

    let response = send(&state, get("/statistics")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_submissions"], 2);
    assert_eq!(body["total_forms"], 1);
    assert_eq!(body["forms"][0]["title"], "Customer Registration");
    assert_eq!(body["forms"][0]["count"], 2);
    assert_eq!(body["forms"][0]["fields"][0]["label"], "Full Name");
}

// -- OpenAPI & metrics --------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let (state, _dir) = test_state(Locale::English);
    let response = send(&state, get("/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/forms/submit"].is_object());
}

#[tokio::test]
async fn test_metrics_endpoint_without_recorder_is_empty() {
    let (state, _dir) = test_state(Locale::English);
    let response = send(&state, get("/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.is_empty());
}
