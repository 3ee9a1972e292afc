//! System endpoints: health check and the upload failure log.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::Role;
use crate::error::{ApiError, ErrorResponse};
use crate::persistence::failed_uploads::FailedUpload;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /system/failed-uploads` — Inspect the upload failure log.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] below admin rank.
#[utoipa::path(
    get,
    path = "/api/v1/system/failed-uploads",
    tag = "System",
    summary = "List upload failures",
    description = "Returns the append-only log of rejected image uploads, newest first.",
    responses(
        (status = 200, description = "Recorded failures", body = Vec<FailedUpload>),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
    )
)]
pub async fn failed_uploads_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    user.require(Role::Admin)?;
    let failures = state.failed_uploads.list().await?;
    Ok(Json(failures))
}

/// Versioned system routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/system/failed-uploads", get(failed_uploads_handler))
}

/// Root-level routes that sit outside the versioned API prefix.
pub fn root_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
