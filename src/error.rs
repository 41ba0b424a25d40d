// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("No active journey")]
    NoActiveJourney,

    #[error("Journey ID mismatch")]
    JourneyIdMismatch,

    #[error("Invalid journey state: {0}")]
    InvalidState(String),

    #[error("Journey already in progress")]
    JourneyAlreadyInProgress,

    #[error("Unable to get current location")]
    LocationUnavailable,

    #[error("Free trial identifications exhausted")]
    TrialExpired,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::NoActiveJourney => (StatusCode::NOT_FOUND, "no_active_journey", None),
            AppError::JourneyIdMismatch => (StatusCode::BAD_REQUEST, "journey_id_mismatch", None),
            AppError::InvalidState(msg) => {
                (StatusCode::CONFLICT, "invalid_state", Some(msg.clone()))
            }
            AppError::JourneyAlreadyInProgress => {
                (StatusCode::CONFLICT, "journey_already_in_progress", None)
            }
            AppError::LocationUnavailable => {
                (StatusCode::UNPROCESSABLE_ENTITY, "location_unavailable", None)
            }
            AppError::TrialExpired => (StatusCode::PAYMENT_REQUIRED, "trial_expired", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
