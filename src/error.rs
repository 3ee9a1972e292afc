//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and a structured JSON error
//! response with a stable snake_case code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "not found: listing 7f1a..."
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with a stable code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Stable snake_case error code clients can branch on.
    pub code: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// Domain errors are constructed at the point of detection and pass
/// through untouched to the [`IntoResponse`] boundary. Infrastructure
/// failures (`Database`, `Storage`, `Internal`) are reported as a
/// generic internal error without leaking detail to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request outside the permissive-ignore filter paths.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but disallowed: insufficient role or device
    /// fingerprint mismatch.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Requested entity does not exist (or is invisible to the caller).
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate entity or malformed nested-JSON field.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Schema validation failure.
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// Persistence layer failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Object storage failure that must surface to the caller.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the stable error code for this variant.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unprocessable(_) => "unprocessable",
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => "internal_server_error",
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message exposed to the client. Infrastructure failures are
    /// replaced by a generic message; the detail stays in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.public_message(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_taxonomy() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Unprocessable("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = ApiError::Internal("connection string was postgres://secret".into());
        assert_eq!(err.public_message(), "internal server error");
        assert_eq!(err.code(), "internal_server_error");
    }
}
