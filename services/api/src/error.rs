//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;
use lectern_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    /// Maps each error class onto one HTTP status.
    ///
    /// Client-facing variants keep their message; everything else is logged
    /// and collapsed into a generic 500 so internal details never leak.
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Port(PortError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Port(PortError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Port(PortError::Unavailable(msg)) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
