// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Journey tracking routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    Discovery, DiscoveryType, GeoBounds, GeoPoint, Journey, JourneyStats, JourneyStatus,
    JourneySummaryStats,
};
use crate::services::journey::{ListCursor, MetadataUpdate};
use crate::services::JourneyService;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Journey routes (require device identity).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/journeys", post(start_journey).get(list_journeys))
        .route("/api/journeys/active", get(get_active_journey))
        .route("/api/journeys/summary", get(get_summary))
        .route(
            "/api/journeys/{id}",
            get(get_journey).patch(update_journey).delete(delete_journey),
        )
        .route("/api/journeys/{id}/pause", post(pause_journey))
        .route("/api/journeys/{id}/resume", post(resume_journey))
        .route("/api/journeys/{id}/end", post(end_journey))
        .route("/api/journeys/{id}/cancel", post(cancel_journey))
        .route("/api/journeys/{id}/locations", post(record_location))
        .route("/api/journeys/{id}/discoveries", post(add_discovery))
        .route("/api/journeys/{id}/share", post(share_journey))
        .route("/api/journeys/{id}/gpx", get(export_gpx))
}

// ─── Request/Response Types ──────────────────────────────────

/// A GPS fix in a request body.
#[derive(Debug, Deserialize, Validate)]
pub struct GeoPointBody {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub accuracy: Option<f32>,
    /// Fix timestamp; defaults to server time when omitted
    pub timestamp: Option<DateTime<Utc>>,
    pub speed: Option<f32>,
    pub bearing: Option<f32>,
}

impl GeoPointBody {
    fn into_point(self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            accuracy: self.accuracy,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            speed: self.speed,
            bearing: self.bearing,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartJourneyRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Initial GPS fix; absence means the device had no fix
    #[validate(nested)]
    pub location: Option<GeoPointBody>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddDiscoveryRequest {
    #[serde(rename = "type")]
    pub discovery_type: DiscoveryType,
    #[validate(nested)]
    pub location: GeoPointBody,
    #[validate(length(min = 1, max = 1024))]
    pub media_url: String,
    #[validate(nested)]
    pub identification: Option<DiscoveryIdentificationBody>,
    #[validate(length(max = 2000))]
    pub user_notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DiscoveryIdentificationBody {
    pub species_id: String,
    #[validate(length(min = 1, max = 200))]
    pub common_name: String,
    #[validate(length(max = 200))]
    pub scientific_name: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence: f32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJourneyRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
struct ListQuery {
    cursor: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Compact journey representation for listings.
#[derive(Serialize)]
pub struct JourneySummary {
    pub id: Uuid,
    pub title: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub status: JourneyStatus,
    pub stats: JourneyStats,
    /// Precision-5 encoded route polyline
    pub polyline: String,
    pub bounds: Option<GeoBounds>,
}

impl JourneySummary {
    fn from_journey(journey: &Journey) -> Result<JourneySummary> {
        Ok(JourneySummary {
            id: journey.id,
            title: journey.title.clone(),
            start_date: format_utc_rfc3339(journey.start_time),
            end_date: journey.end_time.map(format_utc_rfc3339),
            status: journey.status,
            stats: journey.stats.clone(),
            polyline: JourneyService::route_polyline(journey)?,
            bounds: GeoBounds::from_points(&journey.route),
        })
    }
}

#[derive(Serialize)]
pub struct JourneyListResponse {
    pub journeys: Vec<JourneySummary>,
    pub next_cursor: Option<String>,
}

#[derive(Serialize)]
pub struct ShareResponse {
    pub share_url: String,
}

// ─── Lifecycle ───────────────────────────────────────────────

/// Start a new journey from the device's current fix.
async fn start_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<StartJourneyRequest>,
) -> Result<Json<Journey>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let journey = state
        .journeys
        .start(
            &user.user_id,
            body.title,
            body.description,
            body.location.map(GeoPointBody::into_point),
        )
        .await?;

    Ok(Json(journey))
}

async fn pause_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Journey>> {
    Ok(Json(state.journeys.pause(&user.user_id, id).await?))
}

async fn resume_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Journey>> {
    Ok(Json(state.journeys.resume(&user.user_id, id).await?))
}

async fn end_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Journey>> {
    Ok(Json(state.journeys.end(&user.user_id, id).await?))
}

async fn cancel_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode> {
    state.journeys.cancel(&user.user_id, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

// ─── Route Recording ─────────────────────────────────────────

/// Ingest a GPS fix. Fixes posted while paused are dropped.
async fn record_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<GeoPointBody>,
) -> Result<Json<Journey>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let journey = state
        .journeys
        .record_location(&user.user_id, id, body.into_point())
        .await?;
    Ok(Json(journey))
}

/// Record a species discovery against the live journey.
async fn add_discovery(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddDiscoveryRequest>,
) -> Result<Json<Journey>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let discovery = Discovery {
        id: Uuid::new_v4(),
        journey_id: Some(id),
        discovery_type: body.discovery_type,
        timestamp: Utc::now(),
        location: body.location.into_point(),
        media_url: body.media_url,
        identification: body.identification.map(|b| {
            crate::models::discovery::DiscoveryIdentification {
                species_id: b.species_id,
                common_name: b.common_name,
                scientific_name: b.scientific_name,
                confidence: b.confidence,
            }
        }),
        user_notes: body.user_notes,
        is_favorite: false,
        tags: body.tags,
    };

    let journey = state
        .journeys
        .add_discovery(&user.user_id, id, discovery)
        .await?;
    Ok(Json(journey))
}

// ─── Queries ─────────────────────────────────────────────────

async fn get_active_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Journey>> {
    state
        .journeys
        .active_journey(&user.user_id)
        .await
        .map(Json)
        .ok_or(AppError::NoActiveJourney)
}

async fn get_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Journey>> {
    Ok(Json(state.journeys.get(&user.user_id, id).await?))
}

/// List saved journeys, newest first, with cursor pagination.
async fn list_journeys(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListQuery>,
) -> Result<Json<JourneyListResponse>> {
    let cursor = params
        .cursor
        .as_deref()
        .map(ListCursor::decode)
        .transpose()?;

    let (journeys, next_cursor) = state
        .journeys
        .list(&user.user_id, cursor, params.limit)
        .await?;

    let summaries = journeys
        .iter()
        .map(JourneySummary::from_journey)
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(JourneyListResponse {
        journeys: summaries,
        next_cursor: next_cursor.map(|c| c.encode()),
    }))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<JourneySummaryStats>> {
    Ok(Json(state.journeys.summary(&user.user_id).await?))
}

// ─── Editing / Sharing / Export ──────────────────────────────

async fn update_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateJourneyRequest>,
) -> Result<Json<Journey>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let update = MetadataUpdate {
        title: body.title,
        description: body.description,
        tags: body.tags,
        notes: body.notes,
    };
    let journey = state
        .journeys
        .update_metadata(&user.user_id, id, update)
        .await?;
    Ok(Json(journey))
}

async fn delete_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode> {
    state.journeys.delete(&user.user_id, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn share_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShareResponse>> {
    let share_url = state.journeys.share(&user.user_id, id).await?;
    Ok(Json(ShareResponse { share_url }))
}

/// Export a journey route as a GPX 1.1 document.
async fn export_gpx(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let journey = state.journeys.get(&user.user_id, id).await?;
    let gpx = crate::services::gpx::to_gpx(&journey);

    Ok((
        [(header::CONTENT_TYPE, "application/gpx+xml")],
        gpx,
    ))
}
