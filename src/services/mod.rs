// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod gpx;
pub mod history;
pub mod journey;
pub mod trial;

pub use history::{HistoryService, SaveIdentificationRequest};
pub use journey::JourneyService;
pub use trial::TrialService;
