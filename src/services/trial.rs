// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Free-trial gating and subscription entitlements.
//!
//! Free users get a fixed allowance of identifications; premium users
//! bypass the counter entirely. A consume is charged once per successful
//! identification - callers must not consume on failed or retried
//! attempts.

use crate::error::AppError;
use crate::models::{SubscriptionStatus, TrialState};
use crate::storage::{keys, Store};
use chrono::Utc;

/// Service managing trial state and entitlements.
#[derive(Clone)]
pub struct TrialService {
    store: Store,
    max_trial_identifications: u32,
}

impl TrialService {
    pub fn new(store: Store, max_trial_identifications: u32) -> Self {
        Self {
            store,
            max_trial_identifications,
        }
    }

    /// Current trial state for a user (a fresh allowance if none stored).
    pub async fn status(&self, user_id: &str) -> Result<TrialState, AppError> {
        Ok(self
            .store
            .get(&keys::trial(user_id))
            .await?
            .unwrap_or_else(|| TrialState::with_max(self.max_trial_identifications)))
    }

    /// Charge one identification against the user's allowance.
    ///
    /// Premium users are never charged; their state is returned untouched.
    /// Free users get `TrialExpired` once the allowance is exhausted.
    pub async fn consume(&self, user_id: &str) -> Result<TrialState, AppError> {
        let state = self.status(user_id).await?;

        if self.has_premium_access(user_id).await? {
            return Ok(state);
        }

        if !state.can_identify() {
            return Err(AppError::TrialExpired);
        }

        let state = state.use_identification(Utc::now());
        self.store.set(&keys::trial(user_id), &state).await?;

        tracing::info!(
            user_id,
            remaining = state.remaining_identifications,
            "Trial identification used"
        );
        Ok(state)
    }

    /// Current subscription entitlement (free tier if none stored).
    pub async fn subscription(&self, user_id: &str) -> Result<SubscriptionStatus, AppError> {
        Ok(self
            .store
            .get(&keys::subscription(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Whether the user holds an active, unexpired premium entitlement.
    pub async fn has_premium_access(&self, user_id: &str) -> Result<bool, AppError> {
        let subscription = self.subscription(user_id).await?;

        let expired = subscription
            .expiration_date
            .map(|expires| expires <= Utc::now())
            .unwrap_or(false);

        Ok(subscription.is_active && subscription.is_premium && !expired)
    }

    /// Record a subscription entitlement (written by the billing webhook).
    pub async fn set_subscription(
        &self,
        user_id: &str,
        status: &SubscriptionStatus,
    ) -> Result<(), AppError> {
        self.store.set(&keys::subscription(user_id), status).await?;
        tracing::info!(
            user_id,
            premium = status.is_premium,
            "Subscription updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubscriptionType;

    fn service() -> TrialService {
        TrialService::new(Store::in_memory(), 3)
    }

    fn premium() -> SubscriptionStatus {
        SubscriptionStatus {
            is_active: true,
            is_premium: true,
            subscription_type: SubscriptionType::Monthly,
            expiration_date: None,
        }
    }

    #[tokio::test]
    async fn test_fresh_user_has_full_allowance() {
        let trial = service();
        let state = trial.status("u1").await.unwrap();
        assert_eq!(state.remaining_identifications, 3);
        assert!(state.can_identify());
    }

    #[tokio::test]
    async fn test_consume_exhausts_then_errors() {
        let trial = service();

        for remaining in (0..3).rev() {
            let state = trial.consume("u1").await.unwrap();
            assert_eq!(state.remaining_identifications, remaining);
        }

        let err = trial.consume("u1").await.unwrap_err();
        assert!(matches!(err, AppError::TrialExpired));

        // The stored state stays clamped at zero
        let state = trial.status("u1").await.unwrap();
        assert_eq!(state.remaining_identifications, 0);
        assert!(state.is_trial_expired);
    }

    #[tokio::test]
    async fn test_premium_bypasses_counter() {
        let trial = service();
        trial.set_subscription("u1", &premium()).await.unwrap();

        for _ in 0..10 {
            let state = trial.consume("u1").await.unwrap();
            assert_eq!(state.remaining_identifications, 3);
        }
    }

    #[tokio::test]
    async fn test_expired_subscription_is_not_premium() {
        let trial = service();
        let expired = SubscriptionStatus {
            expiration_date: Some(Utc::now() - chrono::Duration::days(1)),
            ..premium()
        };
        trial.set_subscription("u1", &expired).await.unwrap();

        assert!(!trial.has_premium_access("u1").await.unwrap());
        // Falls back to being charged
        let state = trial.consume("u1").await.unwrap();
        assert_eq!(state.remaining_identifications, 2);
    }
}
