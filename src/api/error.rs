//! API error handling.
//!
//! Every failure leaves the service as a status code plus one JSON envelope:
//!
//! ```json
//! { "error": "task not found", "code": "NOT_FOUND" }
//! ```

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::RepositoryError;

// =============================================================================
// API Error
// =============================================================================

/// API error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
    /// Error code for programmatic handling.
    pub code: String,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response for a malformed task id.
    #[must_use]
    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiError::new("INVALID_ID", message))
    }

    /// Creates a 400 Bad Request response for a body that does not decode.
    #[must_use]
    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::new("INVALID_BODY", message),
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("STORE_UNAVAILABLE", message),
        )
    }

    /// Creates a 504 Gateway Timeout response.
    #[must_use]
    pub fn store_timeout(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            ApiError::new("STORE_TIMEOUT", message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::InvalidId(_) => Self::invalid_id("invalid id"),
            RepositoryError::Timeout(_) => {
                tracing::warn!(%error, "Store call exceeded deadline");
                Self::store_timeout("the task store did not respond in time")
            }
            // Details stay in the log.
            RepositoryError::Unavailable(_) | RepositoryError::Serialization(_) => {
                tracing::error!(%error, "Store operation failed");
                Self::store_unavailable("the task store is unavailable")
            }
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_body(rejection.body_text())
    }
}

/// A path segment that does not decode (for example invalid UTF-8) cannot be
/// an id on any backend.
impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(%rejection, "Rejected task id path segment");
        Self::invalid_id("invalid id")
    }
}

// =============================================================================
// Tests
// =============================================================================
