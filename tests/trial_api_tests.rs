// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trial allowance and subscription tests over the HTTP API.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_fresh_trial_status() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(common::empty_request("GET", "/api/trial"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert_eq!(body["remaining_identifications"], 3);
    assert_eq!(body["is_trial_expired"], false);
    assert_eq!(body["is_premium"], false);
    assert!(body["first_use_timestamp"].is_null());
}

#[tokio::test]
async fn test_allowance_exhausts_to_payment_required() {
    let app = common::create_test_app();

    for remaining in [2, 1, 0] {
        let response = app
            .router
            .clone()
            .oneshot(common::empty_request("POST", "/api/trial/use"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = common::response_json(response).await;
        assert_eq!(body["remaining_identifications"], remaining);
    }

    // Allowance exhausted: the fourth attempt is refused
    let response = app
        .router
        .clone()
        .oneshot(common::empty_request("POST", "/api/trial/use"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = common::response_json(response).await;
    assert_eq!(body["error"], "trial_expired");

    // Status stays clamped at zero
    let response = app
        .router
        .clone()
        .oneshot(common::empty_request("GET", "/api/trial"))
        .await
        .unwrap();
    let body = common::response_json(response).await;
    assert_eq!(body["remaining_identifications"], 0);
    assert_eq!(body["is_trial_expired"], true);
    assert!(body["first_use_timestamp"].is_string());
}

#[tokio::test]
async fn test_premium_subscription_bypasses_allowance() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(common::json_request(
            "PUT",
            "/api/subscription",
            json!({
                "is_active": true,
                "is_premium": true,
                "subscription_type": "monthly"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for _ in 0..5 {
        let response = app
            .router
            .clone()
            .oneshot(common::empty_request("POST", "/api/trial/use"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = common::response_json(response).await;
        assert_eq!(body["remaining_identifications"], 3);
        assert_eq!(body["is_premium"], true);
    }
}

#[tokio::test]
async fn test_get_subscription_defaults_to_free() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(common::empty_request("GET", "/api/subscription"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert_eq!(body["is_active"], false);
    assert_eq!(body["subscription_type"], "free");
}

#[tokio::test]
async fn test_trial_is_per_user() {
    let app = common::create_test_app();

    // Exhaust the default device's allowance
    for _ in 0..3 {
        app.router
            .clone()
            .oneshot(common::empty_request("POST", "/api/trial/use"))
            .await
            .unwrap();
    }

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/trial")
        .header("x-device-id", "fresh-device")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert_eq!(body["remaining_identifications"], 3);
}
