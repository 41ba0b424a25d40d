// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identification history routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CaptureType, HistoryStats, IdentificationRecord, SpeciesCategory};
use crate::services::SaveIdentificationRequest;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// History routes (require device identity).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/history",
            post(save_identification)
                .get(get_history)
                .delete(clear_history),
        )
        .route("/api/history/stats", get(get_stats))
        .route(
            "/api/history/{id}",
            get(get_identification).delete(delete_identification),
        )
        .route("/api/history/{id}/notes", axum::routing::patch(update_notes))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveIdentificationBody {
    pub species_id: String,
    #[validate(length(min = 1, max = 200))]
    pub common_name: String,
    #[validate(length(max = 200))]
    pub scientific_name: String,
    pub category: SpeciesCategory,
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence: f32,
    /// Source path of the uploaded capture file
    #[validate(length(min = 1, max = 1024))]
    pub image_uri: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub accuracy: Option<f32>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub capture_type: CaptureType,
}

#[derive(Deserialize)]
struct HistoryQuery {
    /// Substring search over names and category
    q: Option<String>,
    /// Filter by species category
    category: Option<SpeciesCategory>,
}

#[derive(Deserialize, Validate)]
pub struct UpdateNotesBody {
    #[validate(length(max = 5000))]
    pub notes: String,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub records: Vec<IdentificationRecord>,
    pub total: u32,
}

/// Save an identification to history.
///
/// The premium flag is resolved server-side from the entitlement record;
/// free-tier overflow is trimmed (media files deleted) on the way in.
async fn save_identification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SaveIdentificationBody>,
) -> Result<Json<IdentificationRecord>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let is_premium = state.trial.has_premium_access(&user.user_id).await?;

    let record = state
        .history
        .save(
            &user.user_id,
            SaveIdentificationRequest {
                species_id: body.species_id,
                common_name: body.common_name,
                scientific_name: body.scientific_name,
                category: body.category,
                confidence: body.confidence,
                image_uri: body.image_uri,
                latitude: body.latitude,
                longitude: body.longitude,
                accuracy: body.accuracy,
                notes: body.notes,
                capture_type: body.capture_type,
            },
            is_premium,
        )
        .await?;

    Ok(Json(record))
}

/// Get history, optionally filtered by search query or category.
async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let records = match (params.q.as_deref(), params.category) {
        (Some(query), _) => state.history.search(&user.user_id, query).await?,
        (None, Some(category)) => state.history.by_category(&user.user_id, category).await?,
        (None, None) => state.history.list(&user.user_id).await?,
    };

    Ok(Json(HistoryResponse {
        total: records.len() as u32,
        records,
    }))
}

async fn get_identification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<IdentificationRecord>> {
    Ok(Json(state.history.get(&user.user_id, &id).await?))
}

async fn delete_identification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode> {
    state.history.delete(&user.user_id, &id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn update_notes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateNotesBody>,
) -> Result<Json<IdentificationRecord>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let record = state
        .history
        .update_notes(&user.user_id, &id, body.notes)
        .await?;
    Ok(Json(record))
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<HistoryStats>> {
    Ok(Json(state.history.stats(&user.user_id).await?))
}

/// Clear all history and delete the media files. Permanent.
async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<axum::http::StatusCode> {
    state.history.clear(&user.user_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
