//! Test Helper Utilities
//!
//! Shared utilities for testing tunequiz-server

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{hit, watch_url, FakeCuration, FakeFallbackSearch, FakeMedia, FakeMetadata, FakeSet, RAW_AUDIO};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

use tunequiz_common::config::TomlConfig;
use tunequiz_server::config::ServiceSettings;
use tunequiz_server::{build_router, AppState};

/// Router, its state, and the scratch directory backing it
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub scratch: TempDir,
}

/// Build the full app around fakes, with a private scratch directory
pub fn create_test_app(fakes: &FakeSet) -> TestApp {
    let scratch = tempfile::tempdir().expect("Failed to create scratch dir");
    let toml = TomlConfig {
        scratch_dir: Some(scratch.path().to_path_buf()),
        ..TomlConfig::default()
    };
    let settings = ServiceSettings::with_env_keys(&toml, None, None);
    let state = AppState::new(&settings, fakes.collaborators());
    let router = build_router(state.clone());

    TestApp {
        router,
        state,
        scratch,
    }
}

/// GET returning status and raw body
pub async fn get_raw(app: &Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec(), content_type)
}

/// GET returning status and JSON body (`Null` when the body is not JSON)
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body, _) = get_raw(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

pub async fn post_json(app: &Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Start a round and return its id
pub async fn start_round(app: &Router, uri: &str) -> String {
    let (status, json) = get_json(app, uri).await;
    assert_eq!(status, StatusCode::OK, "start failed: {}", json);
    json["id"].as_str().expect("start response without id").to_string()
}

/// Poll `/status` until the round is ready or failed
pub async fn wait_for_terminal(app: &Router, id: &str) -> Value {
    for _ in 0..200 {
        let (status, json) = get_json(app, &format!("/status?id={}", id)).await;
        assert_eq!(status, StatusCode::OK);
        if json["ready"] == true || !json["error"].is_null() {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("round {} never reached a terminal state", id);
}
