// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wildtrail API Server
//!
//! Tracks nature walks (journeys) with GPS routes and species discoveries,
//! gates free-tier identification usage, and manages identification
//! history for the mobile clients.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wildtrail::{
    config::Config,
    services::{HistoryService, JourneyService, TrialService},
    storage::{MediaStore, Store},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Wildtrail API");

    // Open storage
    let store = Store::open(&config.data_dir).expect("Failed to open data store");
    let media = MediaStore::open(&config.media_dir).expect("Failed to open media store");
    tracing::info!(
        data_dir = %config.data_dir.display(),
        media_dir = %config.media_dir.display(),
        "Storage initialized"
    );

    // Build services
    let journeys = JourneyService::new(
        store.clone(),
        config.share_base_url.clone(),
        config.keep_cancelled_journeys,
    );
    let trial = TrialService::new(store.clone(), config.max_trial_identifications);
    let history = HistoryService::new(store, media, config.free_history_limit);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        journeys,
        trial,
        history,
    });

    // Build router
    let app = wildtrail::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wildtrail=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
