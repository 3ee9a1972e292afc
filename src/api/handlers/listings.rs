//! Listing CRUD handlers.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::ListResponse;
use crate::api::handlers::collect_multipart;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{Audience, Role};
use crate::error::{ApiError, ErrorResponse};

/// `GET /catalog` — Search listings.
///
/// Every query parameter is a filter; unknown parameters are ignored.
/// Public callers only ever see publishable visibility states.
///
/// # Errors
///
/// Returns [`ApiError`] on repository failures.
#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    tag = "Listings",
    summary = "Search listings",
    description = "Returns a page of listings matching the query filters, newest first. Unknown filter parameters are ignored. Public callers are restricted to publishable visibility states.",
    responses(
        (status = 200, description = "Matching listings", body = serde_json::Value),
    )
)]
pub async fn search_listings(
    State(state): State<AppState>,
    audience: Audience,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let (data, query) = state.listings.search(&params, audience).await?;
    Ok(Json(ListResponse {
        data,
        page: query.page,
        limit: query.limit,
    }))
}

/// `GET /catalog/{id}` — Get one listing.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when absent or invisible to the
/// caller.
#[utoipa::path(
    get,
    path = "/api/v1/catalog/{id}",
    tag = "Listings",
    summary = "Get listing details",
    description = "Returns one listing. For public callers a listing outside the active/sold states does not exist, and hidden address details are redacted.",
    params(
        ("id" = uuid::Uuid, Path, description = "Listing UUID"),
    ),
    responses(
        (status = 200, description = "Listing details", body = serde_json::Value),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    audience: Audience,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = state.listings.get(id, audience).await?;
    Ok(Json(listing))
}

/// `POST /catalog` — Create a listing from a multipart form.
///
/// # Errors
///
/// Returns [`ApiError`] for invalid payloads or upload failures.
#[utoipa::path(
    post,
    path = "/api/v1/catalog",
    tag = "Listings",
    summary = "Create a listing",
    description = "Creates a listing from a multipart form: text fields describe the property, file parts are re-encoded to WebP and uploaded in full-size and thumbnail renditions. Any upload failure rejects the creation.",
    responses(
        (status = 201, description = "Listing created", body = serde_json::Value),
        (status = 409, description = "Malformed nested field", body = ErrorResponse),
        (status = 422, description = "Invalid property payload", body = ErrorResponse),
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    _user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (fields, files) = collect_multipart(multipart).await?;
    let listing = state.listings.create(fields, files).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// `PUT /catalog/{id}` — Replace a listing.
///
/// # Errors
///
/// Returns [`ApiError`] for invalid payloads, upload failures or a
/// missing listing.
#[utoipa::path(
    put,
    path = "/api/v1/catalog/{id}",
    tag = "Listings",
    summary = "Update a listing",
    description = "Replaces a listing's property fields. The image set becomes existingImages plus any newly uploaded files; dropped images are removed from storage.",
    params(
        ("id" = uuid::Uuid, Path, description = "Listing UUID"),
    ),
    responses(
        (status = 200, description = "Updated listing", body = serde_json::Value),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn update_listing(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (fields, files) = collect_multipart(multipart).await?;
    let listing = state.listings.update(id, fields, files).await?;
    Ok(Json(listing))
}

/// `DELETE /catalog/{id}` — Remove a listing.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when absent and
/// [`ApiError::Forbidden`] below manager rank.
#[utoipa::path(
    delete,
    path = "/api/v1/catalog/{id}",
    tag = "Listings",
    summary = "Delete a listing",
    description = "Removes a listing and its stored images. Requires at least manager rank.",
    params(
        ("id" = uuid::Uuid, Path, description = "Listing UUID"),
    ),
    responses(
        (status = 200, description = "Removed listing", body = serde_json::Value),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require(Role::Manager)?;
    let removed = state.listings.delete(id).await?;
    Ok(Json(removed))
}

/// Listing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(search_listings).post(create_listing))
        .route(
            "/catalog/{id}",
            get(get_listing)
                .put(update_listing)
                .delete(delete_listing),
        )
}
