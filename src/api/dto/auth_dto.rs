//! Authentication DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::User;

/// Credentials submitted to `POST /auth/login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login name, up to 25 characters.
    pub username: String,
    /// Password, 3 to 50 characters.
    pub password: String,
}

/// Successful authentication: bearer token plus the user's profile.
/// The refresh token travels separately, as an http-only cookie.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// Access token for the `Authorization` header.
    pub token: String,
    /// Authenticated user's profile.
    pub user: User,
}
