//! Authentication handlers: login, refresh, logout, registration.

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::api::dto::{AuthResponse, LoginRequest};
use crate::api::handlers::collect_multipart;
use crate::app_state::AppState;
use crate::auth::{AuthUser, device_fingerprint};
use crate::domain::Role;
use crate::error::{ApiError, ErrorResponse};
use crate::service::RegisterInput;

/// Cookie carrying the refresh token between the browser and this API.
const REFRESH_COOKIE: &str = "refreshToken";

fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/")
        .http_only(true)
        .build()
}

/// `POST /auth/login` — Verify credentials and open a session.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown user and
/// [`ApiError::Unauthorized`] for a wrong password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    summary = "Log in",
    description = "Verifies credentials and opens a refresh session bound to the caller's device fingerprint. The refresh token is set as an http-only cookie; the access token is returned in the body.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = serde_json::Value),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
        (status = 422, description = "Credentials out of bounds", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let fingerprint = device_fingerprint(&headers);
    let (user, pair) = state
        .auth
        .login(&req.username, &req.password, &fingerprint)
        .await?;
    let jar = jar.add(refresh_cookie(pair.refresh_token));
    Ok((
        jar,
        Json(AuthResponse {
            token: pair.access_token,
            user,
        }),
    ))
}

/// `POST /auth/refresh` — Rotate the refresh session.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] without a valid session cookie
/// and [`ApiError::Forbidden`] on a device fingerprint mismatch.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Auth",
    summary = "Refresh the session",
    description = "Exchanges the refresh cookie for a new token pair. The caller's device fingerprint must match the one the session was opened with; a mismatch closes the session.",
    responses(
        (status = 200, description = "New token pair issued", body = serde_json::Value),
        (status = 401, description = "Missing or invalid refresh token", body = ErrorResponse),
        (status = 403, description = "Fingerprint mismatch", body = ErrorResponse),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or_else(|| ApiError::Unauthorized("token_not_found".into()))?;
    let fingerprint = device_fingerprint(&headers);
    let (user, pair) = state.auth.refresh(&token, &fingerprint).await?;
    let jar = jar.add(refresh_cookie(pair.refresh_token));
    Ok((
        jar,
        Json(AuthResponse {
            token: pair.access_token,
            user,
        }),
    ))
}

/// `POST /auth/logout` — Close the session.
///
/// # Errors
///
/// Returns [`ApiError::Database`] on repository failure.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    summary = "Log out",
    description = "Drops the session behind the refresh cookie and clears the cookie.",
    responses(
        (status = 204, description = "Session closed"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        state.auth.logout(cookie.value()).await?;
    }
    let jar = jar.remove(Cookie::from(REFRESH_COOKIE));
    Ok((jar, StatusCode::NO_CONTENT))
}

/// `POST /auth/register` — Register a staff account (admin only).
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] below admin rank and
/// [`ApiError::Conflict`] for duplicate username or email.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    summary = "Register a staff account",
    description = "Creates a staff account from a multipart form; an optional avatar file part is stored as WebP. Only admins may register accounts.",
    responses(
        (status = 201, description = "Account created", body = serde_json::Value),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 409, description = "Duplicate username or email", body = ErrorResponse),
        (status = 422, description = "Invalid profile fields", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    user.require(Role::Admin)?;
    let (mut fields, mut files) = collect_multipart(multipart).await?;
    let input = register_input(&mut fields)?;
    let avatar = files.pop();
    let created = state.auth.register(input, avatar).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /auth/ping` — Liveness probe for the auth slice.
#[utoipa::path(
    get,
    path = "/api/v1/auth/ping",
    tag = "Auth",
    summary = "Ping",
    responses(
        (status = 200, description = "Service is up", body = String),
    )
)]
pub async fn ping() -> &'static str {
    "pong!"
}

fn register_input(fields: &mut Map<String, Value>) -> Result<RegisterInput, ApiError> {
    let required = |fields: &mut Map<String, Value>, key: &str| {
        take_text(fields, key).ok_or_else(|| ApiError::Unprocessable(format!("{key} is required")))
    };
    Ok(RegisterInput {
        name: required(fields, "name")?,
        email: take_text(fields, "email"),
        username: required(fields, "username")?,
        password: required(fields, "password")?,
        phone: required(fields, "phone")?,
        birthday: parse_birthday(take_text(fields, "birthday"))?,
        role: take_text(fields, "role"),
    })
}

pub(crate) fn take_text(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

pub(crate) fn parse_birthday(raw: Option<String>) -> Result<Option<NaiveDate>, ApiError> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::Unprocessable("birthday must be YYYY-MM-DD".into())),
        None => Ok(None),
    }
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/register", post(register))
        .route("/auth/ping", get(ping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_input_requires_the_core_fields() {
        let mut fields = Map::new();
        fields.insert("name".into(), json!("Aliya"));
        fields.insert("username".into(), json!("aliya"));
        fields.insert("password".into(), json!("secret"));
        assert!(matches!(
            register_input(&mut fields),
            Err(ApiError::Unprocessable(_))
        ));
    }

    #[test]
    fn birthday_parses_iso_dates_only() {
        assert!(parse_birthday(Some("1990-05-17".into())).is_ok_and(|d| d.is_some()));
        assert!(parse_birthday(None).is_ok_and(|d| d.is_none()));
        assert!(parse_birthday(Some("17.05.1990".into())).is_err());
    }
}
