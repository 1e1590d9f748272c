//! Unified error handling for the admin API.
//!
//! Every handler returns `Result<T, AppError>`. Errors become JSON bodies:
//!
//! ```text
//! 400 {"error": "invalid request", "issues": [{"field": "...", "message": "..."}]}
//! 404 {"error": "Not found: business BIZ0001"}
//! 500 {"error": "internal server error", "details": "..."}
//! ```

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use loyalty_core::{IdError, ValidationIssue};

use crate::db::RepositoryError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// ID generation or parsing failed.
    #[error("ID error: {0}")]
    Id(#[from] IdError),

    /// Payload failed validation.
    #[error("Invalid request: {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),

    /// Malformed request (unparseable JSON, bad query string).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or wrong admin token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// Shorthand for a single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![ValidationIssue::new(field, message)])
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Id(IdError::InvalidFormat { .. })
            | Self::Validation(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Id(IdError::Exhausted { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                error.debug = ?self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
            ErrorBody {
                error: "internal server error".to_string(),
                issues: Vec::new(),
                details: Some(self.to_string()),
            }
        } else {
            match self {
                Self::Validation(issues) => ErrorBody {
                    error: "invalid request".to_string(),
                    issues,
                    details: None,
                },
                other => ErrorBody {
                    error: other.to_string(),
                    issues: Vec::new(),
                    details: None,
                },
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
