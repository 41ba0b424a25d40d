// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod discovery;
pub mod geo;
pub mod identification;
pub mod journey;
pub mod trial;

pub use discovery::{Discovery, DiscoveryType};
pub use geo::{GeoBounds, GeoPoint};
pub use identification::{CaptureType, HistoryStats, IdentificationRecord, SpeciesCategory};
pub use journey::{Journey, JourneyStats, JourneyStatus, JourneySummaryStats};
pub use trial::{SubscriptionStatus, SubscriptionType, TrialState};
