// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Freemium trial state and subscription entitlements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default free-trial identification allowance.
pub const MAX_TRIAL_COUNT: u32 = 3;

/// Free-tier identification allowance for a user.
///
/// Invariant: `is_trial_expired == (remaining_identifications == 0)`.
/// Mutated only through [`TrialState::use_identification`], which
/// decrements by exactly one, clamped at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialState {
    pub remaining_identifications: u32,
    pub max_trial_identifications: u32,
    pub is_trial_expired: bool,
    /// Set on the first consumed identification, never changed after
    pub first_use_timestamp: Option<DateTime<Utc>>,
}

impl TrialState {
    /// Fresh trial state for a first-time user.
    pub fn new() -> TrialState {
        TrialState::with_max(MAX_TRIAL_COUNT)
    }

    /// Fresh trial state with a configured allowance.
    pub fn with_max(max: u32) -> TrialState {
        TrialState {
            remaining_identifications: max,
            max_trial_identifications: max,
            is_trial_expired: max == 0,
            first_use_timestamp: None,
        }
    }

    /// Whether the user may perform another identification.
    pub fn can_identify(&self) -> bool {
        self.remaining_identifications > 0
    }

    /// Trial progress as a percentage (0-100).
    pub fn progress_percentage(&self) -> f32 {
        if self.max_trial_identifications == 0 {
            return 0.0;
        }
        (self.remaining_identifications as f32 / self.max_trial_identifications as f32) * 100.0
    }

    /// Consume one identification, returning the new state.
    ///
    /// Clamps at zero; calling this on an exhausted state is a no-op apart
    /// from keeping the expired flag set.
    pub fn use_identification(&self, now: DateTime<Utc>) -> TrialState {
        let remaining = self.remaining_identifications.saturating_sub(1);
        TrialState {
            remaining_identifications: remaining,
            max_trial_identifications: self.max_trial_identifications,
            is_trial_expired: remaining == 0,
            first_use_timestamp: self.first_use_timestamp.or(Some(now)),
        }
    }
}

impl Default for TrialState {
    fn default() -> Self {
        TrialState::new()
    }
}

/// Subscription status for premium features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubscriptionStatus {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub subscription_type: SubscriptionType,
    pub expiration_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionType {
    #[default]
    Free,
    Monthly,
    Annual,
}
