//! Authentication and user management service.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{TokenIssuer, TokenPair};
use crate::domain::role::resolve_role_change;
use crate::domain::{Role, Session, User};
use crate::error::ApiError;
use crate::media::MediaStore;
use crate::persistence::{SessionRepo, UserRepo};
use crate::service::property::UploadFile;

/// Storage folder for user avatars.
const AVATAR_FOLDER: &str = "avatars";
/// Width cap for avatar images.
const AVATAR_WIDTH: u32 = 560;

/// A new staff account.
#[derive(Debug)]
pub struct RegisterInput {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Login name.
    pub username: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Contact phone.
    pub phone: String,
    /// Date of birth.
    pub birthday: Option<NaiveDate>,
    /// Requested role; unknown values degrade to the lowest rank.
    pub role: Option<String>,
}

/// Profile changes; absent fields keep their value.
#[derive(Debug, Default)]
pub struct UpdateUserInput {
    /// Display name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Login name.
    pub username: Option<String>,
    /// Requested role.
    pub role: Option<String>,
    /// New plaintext password.
    pub password: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Date of birth.
    pub birthday: Option<NaiveDate>,
}

/// Orchestration layer for credentials, sessions and staff accounts.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: UserRepo,
    sessions: SessionRepo,
    tokens: Arc<TokenIssuer>,
    media: Arc<MediaStore>,
}

impl AuthService {
    /// Creates a new `AuthService`.
    #[must_use]
    pub fn new(
        users: UserRepo,
        sessions: SessionRepo,
        tokens: Arc<TokenIssuer>,
        media: Arc<MediaStore>,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            media,
        }
    }

    /// Verifies credentials and opens a session bound to the device
    /// fingerprint, replacing any previous session from that device.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown user and
    /// [`ApiError::Unauthorized`] for a wrong password.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        fingerprint: &str,
    ) -> Result<(User, TokenPair), ApiError> {
        validate_credentials(username, password)?;
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
        verify_password(password, &user.password_hash)?;

        let pair = self.tokens.issue_pair(&user)?;
        self.sessions
            .replace_for_fingerprint(user.id, &pair.refresh_token, fingerprint)
            .await?;
        info!(username, "user logged in");
        Ok((user, pair))
    }

    /// Rotates a refresh session. The presented token must belong to a
    /// live session, and the caller's fingerprint must match the one
    /// the session was opened with.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for an invalid or unknown
    /// token and [`ApiError::Forbidden`] for a fingerprint mismatch.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        fingerprint: &str,
    ) -> Result<(User, TokenPair), ApiError> {
        self.tokens.verify_refresh(refresh_token)?;
        let session: Session = self
            .sessions
            .find_by_token(refresh_token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("token_not_found".into()))?;
        if session.fingerprint != fingerprint {
            // A stolen token presented from another device kills the
            // session it was stolen from.
            self.sessions.delete_by_token(refresh_token).await?;
            return Err(ApiError::Forbidden("fingerprint mismatch".into()));
        }
        let user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("token_not_found".into()))?;

        let pair = self.tokens.issue_pair(&user)?;
        self.sessions
            .replace_for_fingerprint(user.id, &pair.refresh_token, fingerprint)
            .await?;
        Ok((user, pair))
    }

    /// Closes the session holding the given refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on repository failure.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        self.sessions.delete_by_token(refresh_token).await
    }

    /// Registers a staff account. Uniqueness of username and email is
    /// checked up front to produce a conflict naming the field.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] for duplicates and
    /// [`ApiError::Unprocessable`] for invalid credentials.
    pub async fn register(
        &self,
        input: RegisterInput,
        avatar: Option<UploadFile>,
    ) -> Result<User, ApiError> {
        validate_credentials(&input.username, &input.password)?;
        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(ApiError::Conflict("username already taken".into()));
        }
        if let Some(email) = input.email.as_deref()
            && self.users.find_by_email(email).await?.is_some()
        {
            return Err(ApiError::Conflict("email already taken".into()));
        }

        let password_hash = hash_password(&input.password)?;
        let avatar_url = self.upload_avatar(avatar).await;
        let role = Role::parse(input.role.as_deref().unwrap_or_default());

        let user = self
            .users
            .insert(
                &input.name,
                input.email.as_deref(),
                &input.username,
                role.as_str(),
                &password_hash,
                avatar_url.as_deref(),
                &input.phone,
                input.birthday,
            )
            .await?;
        info!(username = %user.username, role = %user.role, "user registered");
        Ok(user)
    }

    /// Fetches one user by username.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when absent.
    pub async fn get_user(&self, username: &str) -> Result<User, ApiError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))
    }

    /// Lists all users.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on repository failure.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.users.list().await
    }

    /// Updates a user. Role changes follow the demotion rule: anyone
    /// may lower a role, only an admin may raise one; a disallowed
    /// raise keeps the current role silently.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when absent.
    pub async fn update_user(
        &self,
        id: Uuid,
        input: UpdateUserInput,
        avatar: Option<UploadFile>,
        caller_is_admin: bool,
    ) -> Result<User, ApiError> {
        let current = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

        let requested = input.role.as_deref().map_or_else(
            || Role::parse(&current.role),
            Role::parse,
        );
        let role = resolve_role_change(Role::parse(&current.role), requested, caller_is_admin);

        let password_hash = match input.password.as_deref() {
            Some(password) => {
                validate_credentials(
                    input.username.as_deref().unwrap_or(&current.username),
                    password,
                )?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let avatar_url = self.upload_avatar(avatar).await;
        if avatar_url.is_some()
            && let Some(old) = current.avatar.as_deref()
        {
            self.media.delete_by_url(old).await;
        }

        self.users
            .update(
                id,
                input.name.as_deref(),
                input.email.as_deref(),
                input.username.as_deref(),
                role.as_str(),
                password_hash.as_deref(),
                avatar_url.as_deref(),
                input.phone.as_deref(),
                input.birthday,
            )
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))
    }

    /// Deletes a user and, best effort, their avatar. Open sessions are
    /// removed by the schema's cascade.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when absent.
    pub async fn delete_user(&self, id: Uuid) -> Result<User, ApiError> {
        let removed = self
            .users
            .delete(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
        if let Some(avatar) = removed.avatar.as_deref() {
            self.media.delete_by_url(avatar).await;
        }
        Ok(removed)
    }

    /// A broken avatar never fails account management; the upload is
    /// simply skipped.
    async fn upload_avatar(&self, avatar: Option<UploadFile>) -> Option<String> {
        let file = avatar?;
        match self
            .media
            .upload(
                &file.data,
                &file.original_name,
                AVATAR_FOLDER,
                Some(AVATAR_WIDTH),
            )
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(original_name = %file.original_name, error = %e, "avatar upload skipped");
                None
            }
        }
    }
}

/// Schema bounds on credentials: username up to 25 characters,
/// password between 3 and 50.
fn validate_credentials(username: &str, password: &str) -> Result<(), ApiError> {
    if username.is_empty() || username.chars().count() > 25 {
        return Err(ApiError::Unprocessable(
            "username must be between 1 and 25 characters".into(),
        ));
    }
    if !(3..=50).contains(&password.chars().count()) {
        return Err(ApiError::Unprocessable(
            "password must be between 3 and 50 characters".into(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::Internal(format!("stored hash is unreadable: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::Unauthorized("wrong password".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_bounds_are_enforced() {
        assert!(validate_credentials("agent", "secret").is_ok());
        assert!(validate_credentials("", "secret").is_err());
        assert!(validate_credentials(&"a".repeat(26), "secret").is_err());
        assert!(validate_credentials("agent", "ab").is_err());
        assert!(validate_credentials("agent", &"p".repeat(51)).is_err());
        // Boundary values are allowed.
        assert!(validate_credentials(&"a".repeat(25), "abc").is_ok());
        assert!(validate_credentials("agent", &"p".repeat(50)).is_ok());
    }

    #[test]
    fn hashed_password_verifies_and_rejects_others() {
        let hash = hash_password("correct horse").unwrap_or_default();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("battery staple", &hash),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn unreadable_stored_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(ApiError::Internal(_))
        ));
    }
}
