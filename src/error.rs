//! Service error types with HTTP status code mapping.
//!
//! [`CampusError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Registration rejections travel inside [`CampusError::Rejected`] and
//! keep their own codes and messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EventId, RegistrationRejection};
use crate::persistence::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1112,
///     "message": "This event is full: 0 of 2 places left, 1 requested",
///     "details": "event_full"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional machine-readable detail (the rejection kind for rejections).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category             | HTTP Status                    |
/// |-----------|----------------------|--------------------------------|
/// | 1000–1099 | Request validation   | 400 Bad Request                |
/// | 1100–1199 | Registration rules   | 403 (eligibility) / 400        |
/// | 2000–2999 | Identity / Not Found | 401 / 403 / 404                |
/// | 3000–3999 | Server               | 500 / 503                      |
#[derive(Debug, thiserror::Error)]
pub enum CampusError {
    /// Event with the given ID was not found (or is not visible).
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No valid identity was supplied.
    #[error("authentication required")]
    Unauthorized,

    /// The caller may not perform this action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The registration engine refused the request.
    #[error("{0}")]
    Rejected(#[from] RegistrationRejection),

    /// Concurrent writes kept winning; the caller should try again.
    #[error("the event is busy, please try again")]
    Busy(EventId),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CampusError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Rejected(rejection) => rejection.error_code(),
            Self::Unauthorized => 2001,
            Self::Forbidden(_) => 2002,
            Self::EventNotFound(_) => 2004,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Busy(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Rejected(rejection) if rejection.is_eligibility() => StatusCode::FORBIDDEN,
            Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::EventNotFound(_) => StatusCode::NOT_FOUND,
            Self::Busy(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the rejection, if this error is one.
    #[must_use]
    pub const fn rejection(&self) -> Option<&RegistrationRejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<StoreError> for CampusError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::EventNotFound(id),
            StoreError::Conflict { event_id, .. } => Self::Busy(event_id),
            StoreError::AlreadyExists(id) => {
                Self::Internal(format!("event {id} already exists"))
            }
            StoreError::Corrupt { event_id, reason } => {
                Self::Internal(format!("stored event {event_id} is corrupt: {reason}"))
            }
            StoreError::Backend(reason) => Self::PersistenceError(reason),
        }
    }
}

impl IntoResponse for CampusError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.rejection().map(|r| r.kind().to_string()),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
