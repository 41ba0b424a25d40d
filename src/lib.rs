// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wildtrail: track nature walks and the species discovered along them
//!
//! This crate provides the backend API for journey (GPS walk) tracking,
//! species discoveries, free-tier identification gating, and identification
//! history management.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use services::{HistoryService, JourneyService, TrialService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub journeys: JourneyService,
    pub trial: TrialService,
    pub history: HistoryService,
}
