// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{Request, Response};
use std::path::PathBuf;
use std::sync::Arc;
use wildtrail::config::Config;
use wildtrail::routes::create_router;
use wildtrail::services::{HistoryService, JourneyService, TrialService};
use wildtrail::storage::{MediaStore, Store};
use wildtrail::AppState;

/// Device identity header sent with every authenticated request.
pub const TEST_DEVICE_ID: &str = "test-device-1234";

/// Temp-backed test app. The media directory lives inside `_dir` and is
/// removed when the struct drops, so keep it alive for the test's duration.
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Path of a fresh fake capture file inside the temp dir, for history
    /// saves that ingest the source media.
    #[allow(dead_code)]
    pub async fn write_capture(&self, name: &str) -> PathBuf {
        let path = self._dir.path().join(name);
        tokio::fs::write(&path, b"not-really-a-jpeg")
            .await
            .expect("Failed to write capture fixture");
        path
    }
}

/// Create a test app backed by an in-memory store and a temp media dir.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut config = Config::test_default();
    config.data_dir = dir.path().to_path_buf();
    config.media_dir = dir.path().join("media");

    let store = Store::in_memory();
    let media = MediaStore::open(&config.media_dir).expect("Failed to open media store");

    let journeys = JourneyService::new(
        store.clone(),
        config.share_base_url.clone(),
        config.keep_cancelled_journeys,
    );
    let trial = TrialService::new(store.clone(), config.max_trial_identifications);
    let history = HistoryService::new(store, media, config.free_history_limit);

    let state = Arc::new(AppState {
        config,
        journeys,
        trial,
        history,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        _dir: dir,
    }
}

/// Build an authenticated request with a JSON body.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-device-id", TEST_DEVICE_ID)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build an authenticated request with no body.
#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-device-id", TEST_DEVICE_ID)
        .body(Body::empty())
        .unwrap()
}

/// Parse a JSON response body.
#[allow(dead_code)]
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
