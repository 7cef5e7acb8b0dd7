// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure reported by the backing store (or the transport to it).
///
/// The `Display` text is the human-readable message shown to users and is
/// kept verbatim from the store wherever one was provided.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Constraint(String),

    #[error("{0}")]
    Transient(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// User-facing message for this failure.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Another change is in progress: {0}")]
    Busy(#[from] crate::view::Busy),

    #[error("Auth provider error: {0}")]
    AuthProvider(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

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
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Busy(busy) => (StatusCode::CONFLICT, "busy", Some(busy.to_string())),
            AppError::AuthProvider(msg) => {
                (StatusCode::BAD_GATEWAY, "auth_provider_error", Some(msg.clone()))
            }
            AppError::Store(err) => match err {
                StoreError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, "not_found", Some(msg.clone()))
                }
                StoreError::PermissionDenied(msg) => {
                    (StatusCode::FORBIDDEN, "permission_denied", Some(msg.clone()))
                }
                StoreError::Constraint(msg) => {
                    (StatusCode::CONFLICT, "constraint_violation", Some(msg.clone()))
                }
                StoreError::Transient(msg) => {
                    tracing::warn!(error = %msg, "Transient store error");
                    (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", Some(msg.clone()))
                }
                StoreError::Timeout => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "store_timeout",
                    Some(err.message()),
                ),
                StoreError::Cancelled => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "cancelled",
                    Some(err.message()),
                ),
                StoreError::Other(msg) => {
                    tracing::error!(error = %msg, "Store error");
                    (StatusCode::BAD_GATEWAY, "store_error", Some(msg.clone()))
                }
            },
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
