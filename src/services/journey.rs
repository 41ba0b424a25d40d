// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Journey lifecycle state machine and route recording.
//!
//! Each user has at most one live journey, held in a per-user slot. All
//! mutations (lifecycle transitions, location ingest, discovery adds)
//! funnel through the slot's mutex, which serializes concurrent updates
//! from the device. Completed journeys are persisted through the store;
//! cancelled ones are dropped unless configured otherwise.

use crate::error::AppError;
use crate::models::{Discovery, GeoPoint, Journey, JourneyStats, JourneyStatus, JourneySummaryStats};
use crate::storage::{keys, Store};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use geo::LineString;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const DEFAULT_TITLE: &str = "Nature Walk";
const MAX_LIST_LIMIT: usize = 100;

/// The live journey for one user, plus its pause accounting.
struct ActiveSlot {
    journey: Option<LiveJourney>,
}

struct LiveJourney {
    journey: Journey,
    /// Full discovery objects, kept for stats recomputation
    discoveries: Vec<Discovery>,
    pause_started_at: Option<DateTime<Utc>>,
    total_pause_millis: i64,
}

impl LiveJourney {
    /// Recompute stats from the full route and discovery list.
    fn recompute_stats(&mut self) {
        let mut stats = JourneyStats::from_route(&self.journey.route, &self.discoveries);
        stats.pause_duration_millis = self.total_pause_millis;
        self.journey.stats = stats;
    }

    /// Fold an open pause interval into the accumulator.
    fn close_pause(&mut self, now: DateTime<Utc>) {
        if let Some(started) = self.pause_started_at.take() {
            self.total_pause_millis += (now - started).num_milliseconds();
        }
    }
}

/// Service managing journey lifecycles and saved journeys.
#[derive(Clone)]
pub struct JourneyService {
    store: Store,
    share_base_url: String,
    keep_cancelled: bool,
    slots: Arc<DashMap<String, Arc<Mutex<ActiveSlot>>>>,
}

impl JourneyService {
    pub fn new(store: Store, share_base_url: String, keep_cancelled: bool) -> Self {
        Self {
            store,
            share_base_url,
            keep_cancelled,
            slots: Arc::new(DashMap::new()),
        }
    }

    fn slot(&self, user_id: &str) -> Arc<Mutex<ActiveSlot>> {
        self.slots
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ActiveSlot { journey: None })))
            .clone()
    }

    /// Start a new journey from an initial GPS fix.
    ///
    /// Fails with `JourneyAlreadyInProgress` while another journey is live
    /// for this user, and `LocationUnavailable` when the device could not
    /// supply a fix (single best-effort fetch, fail closed).
    pub async fn start(
        &self,
        user_id: &str,
        title: Option<String>,
        description: Option<String>,
        initial_location: Option<GeoPoint>,
    ) -> Result<Journey, AppError> {
        let slot = self.slot(user_id);
        let mut slot = slot.lock().await;

        if slot.journey.is_some() {
            return Err(AppError::JourneyAlreadyInProgress);
        }

        let location = initial_location.ok_or(AppError::LocationUnavailable)?;

        let journey = Journey {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description,
            start_time: Utc::now(),
            end_time: None,
            status: JourneyStatus::Active,
            route: vec![location],
            stats: JourneyStats::default(),
            discoveries: vec![],
            is_public: false,
            share_url: None,
            tags: vec![],
            notes: None,
        };

        tracing::info!(user_id, journey_id = %journey.id, "Journey started");

        slot.journey = Some(LiveJourney {
            journey: journey.clone(),
            discoveries: vec![],
            pause_started_at: None,
            total_pause_millis: 0,
        });

        Ok(journey)
    }

    /// Pause the live journey (ACTIVE → PAUSED). Stops accepting points.
    pub async fn pause(&self, user_id: &str, journey_id: Uuid) -> Result<Journey, AppError> {
        let slot = self.slot(user_id);
        let mut slot = slot.lock().await;

        let live = match slot.journey.as_mut() {
            Some(live) => live,
            None => return Err(self.missing_journey_error(user_id, journey_id).await),
        };
        ensure_id(live, journey_id)?;
        if live.journey.status != JourneyStatus::Active {
            return Err(AppError::InvalidState("journey is not active".to_string()));
        }

        live.pause_started_at = Some(Utc::now());
        live.journey.status = JourneyStatus::Paused;

        tracing::info!(user_id, journey_id = %journey_id, "Journey paused");
        Ok(live.journey.clone())
    }

    /// Resume a paused journey (PAUSED → ACTIVE).
    pub async fn resume(&self, user_id: &str, journey_id: Uuid) -> Result<Journey, AppError> {
        let slot = self.slot(user_id);
        let mut slot = slot.lock().await;

        let live = match slot.journey.as_mut() {
            Some(live) => live,
            None => return Err(self.missing_journey_error(user_id, journey_id).await),
        };
        ensure_id(live, journey_id)?;
        if live.journey.status != JourneyStatus::Paused {
            return Err(AppError::InvalidState("journey is not paused".to_string()));
        }

        live.close_pause(Utc::now());
        live.journey.status = JourneyStatus::Active;

        tracing::info!(
            user_id,
            journey_id = %journey_id,
            pause_millis = live.total_pause_millis,
            "Journey resumed"
        );
        Ok(live.journey.clone())
    }

    /// End the live journey (ACTIVE or PAUSED → COMPLETED).
    ///
    /// Recomputes final stats with the accumulated pause duration, saves
    /// the journey to history, and frees the active slot.
    pub async fn end(&self, user_id: &str, journey_id: Uuid) -> Result<Journey, AppError> {
        let slot = self.slot(user_id);
        let mut slot = slot.lock().await;

        let live = match slot.journey.as_mut() {
            Some(live) => live,
            None => return Err(self.missing_journey_error(user_id, journey_id).await),
        };
        ensure_id(live, journey_id)?;

        let now = Utc::now();
        live.close_pause(now);
        live.recompute_stats();

        let mut completed = live.journey.clone();
        completed.status = JourneyStatus::Completed;
        completed.end_time = Some(now);

        // Persist before touching slot state; a failed write leaves the
        // journey live so `end` can be retried.
        self.append_saved(user_id, completed.clone()).await?;
        slot.journey = None;

        tracing::info!(
            user_id,
            journey_id = %journey_id,
            distance_m = completed.stats.distance_meters,
            discoveries = completed.stats.discovery_count,
            "Journey completed"
        );
        Ok(completed)
    }

    /// Cancel the live journey (ACTIVE or PAUSED → CANCELLED).
    ///
    /// The journey is discarded, not saved to history. With
    /// `keep_cancelled_journeys` set it is retained with CANCELLED status
    /// instead of being dropped.
    pub async fn cancel(&self, user_id: &str, journey_id: Uuid) -> Result<(), AppError> {
        let slot = self.slot(user_id);
        let mut slot = slot.lock().await;

        let live = match slot.journey.as_mut() {
            Some(live) => live,
            None => return Err(self.missing_journey_error(user_id, journey_id).await),
        };
        ensure_id(live, journey_id)?;

        if self.keep_cancelled {
            let mut cancelled = live.journey.clone();
            cancelled.status = JourneyStatus::Cancelled;
            cancelled.end_time = Some(Utc::now());
            self.append_saved(user_id, cancelled).await?;
        }
        slot.journey = None;

        tracing::info!(user_id, journey_id = %journey_id, kept = self.keep_cancelled, "Journey cancelled");
        Ok(())
    }

    /// Record a discovery against the live journey.
    ///
    /// Allowed while the journey is live (active or paused). Stats are
    /// recomputed immediately so discovery counts never go stale waiting
    /// for the next GPS tick.
    pub async fn add_discovery(
        &self,
        user_id: &str,
        journey_id: Uuid,
        mut discovery: Discovery,
    ) -> Result<Journey, AppError> {
        let slot = self.slot(user_id);
        let mut slot = slot.lock().await;

        let live = match slot.journey.as_mut() {
            Some(live) => live,
            None => return Err(self.missing_journey_error(user_id, journey_id).await),
        };
        ensure_id(live, journey_id)?;

        discovery.journey_id = Some(journey_id);
        live.journey.discoveries.push(discovery.id);
        live.discoveries.push(discovery);
        live.recompute_stats();

        Ok(live.journey.clone())
    }

    /// Ingest a GPS fix for the live journey.
    ///
    /// Ignored (journey returned unchanged) unless the journey is ACTIVE;
    /// otherwise the point is appended and stats are recomputed from the
    /// full route. A fix timestamped before the current route tail is
    /// rejected to keep the route ordered.
    pub async fn record_location(
        &self,
        user_id: &str,
        journey_id: Uuid,
        point: GeoPoint,
    ) -> Result<Journey, AppError> {
        let slot = self.slot(user_id);
        let mut slot = slot.lock().await;

        let live = match slot.journey.as_mut() {
            Some(live) => live,
            None => return Err(self.missing_journey_error(user_id, journey_id).await),
        };
        ensure_id(live, journey_id)?;

        if live.journey.status != JourneyStatus::Active {
            // Fixes arriving while paused are dropped, not an error.
            return Ok(live.journey.clone());
        }

        // Route ordering is by timestamp ascending; a fix older than the
        // tail would make duration and average speed meaningless.
        if let Some(last) = live.journey.route.last() {
            if point.timestamp < last.timestamp {
                return Err(AppError::BadRequest(
                    "location timestamp precedes the route tail".to_string(),
                ));
            }
        }

        live.journey.route.push(point);
        live.recompute_stats();

        Ok(live.journey.clone())
    }

    /// The live journey for a user, if any.
    pub async fn active_journey(&self, user_id: &str) -> Option<Journey> {
        let slot = self.slot(user_id);
        let slot = slot.lock().await;
        slot.journey.as_ref().map(|live| live.journey.clone())
    }

    /// Fetch a journey by id: the live one first, then saved ones.
    pub async fn get(&self, user_id: &str, journey_id: Uuid) -> Result<Journey, AppError> {
        if let Some(journey) = self.active_journey(user_id).await {
            if journey.id == journey_id {
                return Ok(journey);
            }
        }

        self.load_saved(user_id)
            .await?
            .into_iter()
            .find(|j| j.id == journey_id)
            .ok_or_else(|| AppError::NotFound(format!("Journey {} not found", journey_id)))
    }

    /// List saved journeys newest-first with cursor pagination.
    pub async fn list(
        &self,
        user_id: &str,
        cursor: Option<ListCursor>,
        limit: usize,
    ) -> Result<(Vec<Journey>, Option<ListCursor>), AppError> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);

        // Cursors carry millisecond timestamps, so order at millisecond
        // granularity (ties broken by id) to keep pages stable.
        let sort_key = |j: &Journey| (j.start_time.timestamp_millis(), j.id);

        let mut journeys = self.load_saved(user_id).await?;
        journeys.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));

        // Keep only entries strictly after the cursor position in the
        // newest-first ordering.
        if let Some(cursor) = cursor {
            let cursor_key = (cursor.start_time.timestamp_millis(), cursor.journey_id);
            journeys.retain(|j| sort_key(j) < cursor_key);
        }

        let has_more = journeys.len() > limit;
        journeys.truncate(limit);

        let next_cursor = if has_more {
            journeys.last().map(|j| ListCursor {
                start_time: j.start_time,
                journey_id: j.id,
            })
        } else {
            None
        };

        Ok((journeys, next_cursor))
    }

    /// Update title/description/tags/notes on a live or saved journey.
    pub async fn update_metadata(
        &self,
        user_id: &str,
        journey_id: Uuid,
        update: MetadataUpdate,
    ) -> Result<Journey, AppError> {
        // Live journey first
        {
            let slot = self.slot(user_id);
            let mut slot = slot.lock().await;
            if let Some(live) = slot.journey.as_mut() {
                if live.journey.id == journey_id {
                    update.apply(&mut live.journey);
                    return Ok(live.journey.clone());
                }
            }
        }

        self.modify_saved(user_id, journey_id, |journey| update.apply(journey))
            .await
    }

    /// Delete a saved journey.
    pub async fn delete(&self, user_id: &str, journey_id: Uuid) -> Result<(), AppError> {
        let mut journeys = self.load_saved(user_id).await?;
        let before = journeys.len();
        journeys.retain(|j| j.id != journey_id);

        if journeys.len() == before {
            return Err(AppError::NotFound(format!(
                "Journey {} not found",
                journey_id
            )));
        }

        self.store.set(&keys::journeys(user_id), &journeys).await?;
        tracing::info!(user_id, journey_id = %journey_id, "Journey deleted");
        Ok(())
    }

    /// Mark a journey public and return its share URL.
    pub async fn share(&self, user_id: &str, journey_id: Uuid) -> Result<String, AppError> {
        let share_url = format!("{}/journey/{}", self.share_base_url, journey_id);

        // Live journey first
        {
            let slot = self.slot(user_id);
            let mut slot = slot.lock().await;
            if let Some(live) = slot.journey.as_mut() {
                if live.journey.id == journey_id {
                    live.journey.is_public = true;
                    live.journey.share_url = Some(share_url.clone());
                    return Ok(share_url);
                }
            }
        }

        let url = share_url.clone();
        self.modify_saved(user_id, journey_id, move |journey| {
            journey.is_public = true;
            journey.share_url = Some(url.clone());
        })
        .await?;
        Ok(share_url)
    }

    /// Totals across the user's completed journeys.
    pub async fn summary(&self, user_id: &str) -> Result<JourneySummaryStats, AppError> {
        let journeys = self.load_saved(user_id).await?;
        Ok(JourneySummaryStats::from_journeys(&journeys))
    }

    /// Encode a route as a precision-5 polyline for compact summaries.
    pub fn route_polyline(journey: &Journey) -> Result<String, AppError> {
        let line: LineString<f64> = journey
            .route
            .iter()
            .map(|p| (p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .into();

        polyline::encode_coordinates(line, 5)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Polyline encoding failed: {}", e)))
    }

    /// Distinguish "no live journey" from "that journey already finished".
    ///
    /// Transitions on a completed or cancelled journey must fail with
    /// `InvalidState`, not `NoActiveJourney`, even though finished
    /// journeys never occupy the slot.
    async fn missing_journey_error(&self, user_id: &str, journey_id: Uuid) -> AppError {
        match self.load_saved(user_id).await {
            Ok(saved) if saved.iter().any(|j| j.id == journey_id) => {
                AppError::InvalidState("journey already finished".to_string())
            }
            _ => AppError::NoActiveJourney,
        }
    }

    async fn load_saved(&self, user_id: &str) -> Result<Vec<Journey>, AppError> {
        Ok(self
            .store
            .get(&keys::journeys(user_id))
            .await?
            .unwrap_or_default())
    }

    async fn append_saved(&self, user_id: &str, journey: Journey) -> Result<(), AppError> {
        let mut journeys = self.load_saved(user_id).await?;
        journeys.push(journey);
        self.store.set(&keys::journeys(user_id), &journeys).await
    }

    async fn modify_saved(
        &self,
        user_id: &str,
        journey_id: Uuid,
        mutate: impl FnOnce(&mut Journey),
    ) -> Result<Journey, AppError> {
        let mut journeys = self.load_saved(user_id).await?;
        let journey = journeys
            .iter_mut()
            .find(|j| j.id == journey_id)
            .ok_or_else(|| AppError::NotFound(format!("Journey {} not found", journey_id)))?;

        mutate(journey);
        let updated = journey.clone();
        self.store.set(&keys::journeys(user_id), &journeys).await?;
        Ok(updated)
    }
}

/// Opaque pagination cursor over saved journeys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListCursor {
    pub start_time: DateTime<Utc>,
    pub journey_id: Uuid,
}

impl ListCursor {
    /// Encode as an opaque URL-safe token.
    pub fn encode(&self) -> String {
        let payload = format!("{}:{}", self.start_time.timestamp_millis(), self.journey_id);
        URL_SAFE_NO_PAD.encode(payload)
    }

    /// Decode an opaque token, rejecting malformed input.
    pub fn decode(raw: &str) -> Result<ListCursor, AppError> {
        let invalid_cursor =
            || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

        let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
        let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

        let (millis, id) = decoded_str.split_once(':').ok_or_else(invalid_cursor)?;
        let millis: i64 = millis.parse().map_err(|_| invalid_cursor())?;
        let journey_id: Uuid = id.parse().map_err(|_| invalid_cursor())?;
        let start_time = DateTime::from_timestamp_millis(millis).ok_or_else(invalid_cursor)?;

        Ok(ListCursor {
            start_time,
            journey_id,
        })
    }
}

/// Partial metadata update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl MetadataUpdate {
    fn apply(&self, journey: &mut Journey) {
        if let Some(title) = &self.title {
            journey.title = title.clone();
        }
        if let Some(description) = &self.description {
            journey.description = Some(description.clone());
        }
        if let Some(tags) = &self.tags {
            journey.tags = tags.clone();
        }
        if let Some(notes) = &self.notes {
            journey.notes = Some(notes.clone());
        }
    }
}

fn ensure_id(live: &LiveJourney, journey_id: Uuid) -> Result<(), AppError> {
    if live.journey.id != journey_id {
        return Err(AppError::JourneyIdMismatch);
    }
    Ok(())
}
