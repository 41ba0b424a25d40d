// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trial gating and subscription routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{SubscriptionStatus, TrialState};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Trial/subscription routes (require device identity).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trial", get(get_trial_status))
        .route("/api/trial/use", post(use_identification))
        .route("/api/subscription", put(set_subscription).get(get_subscription))
}

#[derive(Serialize)]
pub struct TrialStatusResponse {
    #[serde(flatten)]
    pub state: TrialState,
    /// Premium users bypass the trial counter entirely
    pub is_premium: bool,
}

/// Get the current trial allowance.
async fn get_trial_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TrialStatusResponse>> {
    let trial_state = state.trial.status(&user.user_id).await?;
    let is_premium = state.trial.has_premium_access(&user.user_id).await?;

    Ok(Json(TrialStatusResponse {
        state: trial_state,
        is_premium,
    }))
}

/// Charge one identification against the allowance.
///
/// Called by the identification flow once per successful identification;
/// failed or retried attempts must not be charged. Returns 402 once the
/// free allowance is exhausted.
async fn use_identification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TrialStatusResponse>> {
    let trial_state = state.trial.consume(&user.user_id).await?;
    let is_premium = state.trial.has_premium_access(&user.user_id).await?;

    Ok(Json(TrialStatusResponse {
        state: trial_state,
        is_premium,
    }))
}

async fn get_subscription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SubscriptionStatus>> {
    Ok(Json(state.trial.subscription(&user.user_id).await?))
}

/// Record the entitlement pushed by the billing provider.
async fn set_subscription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SubscriptionStatus>,
) -> Result<Json<SubscriptionStatus>> {
    state.trial.set_subscription(&user.user_id, &body).await?;
    Ok(Json(body))
}
