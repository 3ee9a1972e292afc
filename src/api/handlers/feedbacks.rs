//! Feedback handlers: public lead capture plus admin triage.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{FeedbackCreateRequest, FeedbackListQuery, FeedbackUpdateRequest};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::Role;
use crate::error::{ApiError, ErrorResponse};
use crate::service::FeedbackUpdate;

/// `POST /orders/feedback` — Capture a lead (public).
///
/// # Errors
///
/// Returns [`ApiError`] on repository failures.
#[utoipa::path(
    post,
    path = "/api/v1/orders/feedback",
    tag = "Feedbacks",
    summary = "Submit a feedback",
    description = "Public lead capture. When the lead references a listing, a human-readable title and the responsible agent are denormalized from it and frozen. A Telegram notification is sent, best effort.",
    request_body = FeedbackCreateRequest,
    responses(
        (status = 201, description = "Feedback created", body = serde_json::Value),
        (status = 404, description = "Referenced listing not found", body = ErrorResponse),
    )
)]
pub async fn create_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = state
        .feedbacks
        .create(
            &req.name,
            &req.phone,
            req.estate_id,
            req.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

/// `GET /orders/feedback` — List leads.
///
/// # Errors
///
/// Returns [`ApiError`] on repository failures.
#[utoipa::path(
    get,
    path = "/api/v1/orders/feedback",
    tag = "Feedbacks",
    summary = "List feedbacks",
    description = "Returns leads newest first. Without an explicit status only open leads (new and inWork) are returned.",
    params(FeedbackListQuery),
    responses(
        (status = 200, description = "Leads", body = serde_json::Value),
    )
)]
pub async fn list_feedbacks(
    State(state): State<AppState>,
    Query(query): Query<FeedbackListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let leads = state
        .feedbacks
        .list(query.status.as_deref(), query.estate_id)
        .await?;
    Ok(Json(leads))
}

/// `GET /orders/feedback/{id}` — Get one lead.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when absent.
#[utoipa::path(
    get,
    path = "/api/v1/orders/feedback/{id}",
    tag = "Feedbacks",
    summary = "Get feedback details",
    params(
        ("id" = uuid::Uuid, Path, description = "Feedback UUID"),
    ),
    responses(
        (status = 200, description = "Feedback details", body = serde_json::Value),
        (status = 404, description = "Feedback not found", body = ErrorResponse),
    )
)]
pub async fn get_feedback(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = state.feedbacks.get(id).await?;
    Ok(Json(feedback))
}

/// `PUT /orders/feedback/{id}` — Update a lead.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when absent.
#[utoipa::path(
    put,
    path = "/api/v1/orders/feedback/{id}",
    tag = "Feedbacks",
    summary = "Update a feedback",
    description = "Updates lead fields. Re-targeting to another listing re-derives the frozen title and agent.",
    params(
        ("id" = uuid::Uuid, Path, description = "Feedback UUID"),
    ),
    request_body = FeedbackUpdateRequest,
    responses(
        (status = 200, description = "Updated feedback", body = serde_json::Value),
        (status = 404, description = "Feedback not found", body = ErrorResponse),
    )
)]
pub async fn update_feedback(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<FeedbackUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = state
        .feedbacks
        .update(
            id,
            FeedbackUpdate {
                name: req.name,
                phone: req.phone,
                status: req.status,
                estate_id: req.estate_id,
                description: req.description,
            },
        )
        .await?;
    Ok(Json(feedback))
}

/// `DELETE /orders/feedback/{id}` — Remove a lead.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when absent and
/// [`ApiError::Forbidden`] below manager rank.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/feedback/{id}",
    tag = "Feedbacks",
    summary = "Delete a feedback",
    params(
        ("id" = uuid::Uuid, Path, description = "Feedback UUID"),
    ),
    responses(
        (status = 200, description = "Removed feedback", body = serde_json::Value),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 404, description = "Feedback not found", body = ErrorResponse),
    )
)]
pub async fn delete_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require(Role::Manager)?;
    let removed = state.feedbacks.delete(id).await?;
    Ok(Json(removed))
}

/// Feedback routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders/feedback",
            get(list_feedbacks).post(create_feedback),
        )
        .route(
            "/orders/feedback/{id}",
            get(get_feedback)
                .put(update_feedback)
                .delete(delete_feedback),
        )
}
