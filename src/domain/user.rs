//! User and refresh-session entities.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Credential and profile record for an agency user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email, unique when present.
    pub email: Option<String>,
    /// Login name, unique.
    pub username: String,
    /// Role within the hierarchy, stored as text.
    pub role: String,
    /// Argon2 password hash. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Public URL of the avatar image.
    pub avatar: Option<String>,
    /// Contact phone.
    pub phone: String,
    /// Date of birth.
    pub birthday: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// An active refresh session bound to a device fingerprint.
///
/// At most one live session exists per fingerprint: a new login from
/// the same device replaces the previous session.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Session identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// The refresh token issued for this session.
    pub refresh_token: String,
    /// Hex SHA-256 fingerprint of the device that logged in.
    pub fingerprint: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
