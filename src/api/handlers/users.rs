//! Staff user management handlers.

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::handlers::auth::{parse_birthday, take_text};
use crate::api::handlers::collect_multipart;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::Role;
use crate::error::{ApiError, ErrorResponse};
use crate::service::UpdateUserInput;

/// `GET /users` — List staff accounts.
///
/// # Errors
///
/// Returns [`ApiError`] on repository failures.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    summary = "List users",
    responses(
        (status = 200, description = "Staff accounts", body = serde_json::Value),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.auth.list_users().await?;
    Ok(Json(users))
}

/// `GET /users/{username}` — Get one staff account.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when absent.
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    tag = "Users",
    summary = "Get user details",
    params(
        ("username" = String, Path, description = "Username"),
    ),
    responses(
        (status = 200, description = "User details", body = serde_json::Value),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.get_user(&username).await?;
    Ok(Json(user))
}

/// `PUT /users/{id}` — Update a staff account.
///
/// Non-admins may only update their own account. Role changes follow
/// the demotion rule: anyone may lower a role, only an admin may
/// raise one.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] when a non-admin targets another
/// account and [`ApiError::NotFound`] when absent.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Update a user",
    description = "Updates profile fields from a multipart form; an optional avatar file part replaces the stored avatar. A role raise is silently kept at the current role unless the caller is an admin.",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "Updated user", body = serde_json::Value),
        (status = 403, description = "Not allowed to update this account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Invalid profile fields", body = ErrorResponse),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let caller_is_admin = user.role() == Role::Admin;
    if !caller_is_admin && user.claims.id != id {
        return Err(ApiError::Forbidden("not_allowed".into()));
    }
    let (mut fields, mut files) = collect_multipart(multipart).await?;
    let input = UpdateUserInput {
        name: take_text(&mut fields, "name"),
        email: take_text(&mut fields, "email"),
        username: take_text(&mut fields, "username"),
        role: take_text(&mut fields, "role"),
        password: take_text(&mut fields, "password"),
        phone: take_text(&mut fields, "phone"),
        birthday: parse_birthday(take_text(&mut fields, "birthday"))?,
    };
    let avatar = files.pop();
    let updated = state
        .auth
        .update_user(id, input, avatar, caller_is_admin)
        .await?;
    Ok(Json(updated))
}

/// `DELETE /users/{id}` — Remove a staff account (admin only).
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] below admin rank and
/// [`ApiError::NotFound`] when absent.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Delete a user",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "Removed user", body = serde_json::Value),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require(Role::Admin)?;
    let removed = state.auth.delete_user(id).await?;
    Ok(Json(removed))
}

/// User management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        // One parameterized segment, read as a username on GET and as
        // a UUID on PUT and DELETE.
        .route(
            "/users/{key}",
            get(get_user).put(update_user).delete(delete_user),
        )
}
