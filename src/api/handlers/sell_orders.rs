//! Sell order handlers: public intake plus admin workflow.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::api::dto::StatusQuery;
use crate::api::handlers::collect_multipart;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{Audience, Role};
use crate::error::{ApiError, ErrorResponse};

/// `POST /orders/sell` — Submit an intake order (public).
///
/// # Errors
///
/// Returns [`ApiError`] for invalid payloads.
#[utoipa::path(
    post,
    path = "/api/v1/orders/sell",
    tag = "Sell orders",
    summary = "Submit a sell order",
    description = "Public intake endpoint. Broken image uploads are logged and skipped rather than rejecting the submission. A Telegram notification is sent on success, best effort.",
    responses(
        (status = 201, description = "Order created", body = serde_json::Value),
        (status = 422, description = "Invalid property payload", body = ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (fields, files) = collect_multipart(multipart).await?;
    let order = state.orders.create(fields, files).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /orders/sell` — List orders.
///
/// # Errors
///
/// Returns [`ApiError`] on repository failures.
#[utoipa::path(
    get,
    path = "/api/v1/orders/sell",
    tag = "Sell orders",
    summary = "List sell orders",
    description = "Returns orders newest first, optionally narrowed to one lifecycle status. Public callers see orders without owner contact details.",
    params(StatusQuery),
    responses(
        (status = 200, description = "Orders", body = serde_json::Value),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    audience: Audience,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state.orders.list(query.status.as_deref(), audience).await?;
    Ok(Json(orders))
}

/// `GET /orders/sell/{id}` — Get one order (admin only).
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when absent and
/// [`ApiError::Forbidden`] below admin rank.
#[utoipa::path(
    get,
    path = "/api/v1/orders/sell/{id}",
    tag = "Sell orders",
    summary = "Get order details",
    params(
        ("id" = uuid::Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order details", body = serde_json::Value),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    audience: Audience,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require(Role::Admin)?;
    let order = state.orders.get(id, audience).await?;
    Ok(Json(order))
}

/// `PATCH /orders/sell/{id}` — Update an order.
///
/// An explicit `completed` status materializes a listing from the
/// order exactly once, no matter how often it is repeated.
///
/// # Errors
///
/// Returns [`ApiError`] for invalid payloads or a missing order.
#[utoipa::path(
    patch,
    path = "/api/v1/orders/sell/{id}",
    tag = "Sell orders",
    summary = "Update a sell order",
    description = "Replaces the order's property fields and advances its lifecycle. The first transition into completed materializes a listing and records its id on the order.",
    params(
        ("id" = uuid::Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Updated order", body = serde_json::Value),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.orders.update(id, payload).await?;
    Ok(Json(order))
}

/// `DELETE /orders/sell/{id}` — Remove an order.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when absent and
/// [`ApiError::Forbidden`] below admin rank.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/sell/{id}",
    tag = "Sell orders",
    summary = "Delete a sell order",
    params(
        ("id" = uuid::Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Removed order", body = serde_json::Value),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require(Role::Admin)?;
    let removed = state.orders.delete(id).await?;
    Ok(Json(removed))
}

/// Sell order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders/sell", get(list_orders).post(create_order))
        .route(
            "/orders/sell/{id}",
            get(get_order).patch(update_order).delete(delete_order),
        )
}
