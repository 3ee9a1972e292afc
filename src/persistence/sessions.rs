//! Refresh-session repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Session;
use crate::error::ApiError;

/// PostgreSQL-backed refresh-session repository.
#[derive(Debug, Clone)]
pub struct SessionRepo {
    pool: PgPool,
}

impl SessionRepo {
    /// Creates a repository over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replaces the session for a device: any previous session with the
    /// same fingerprint is dropped, then the new one is stored. Keeps
    /// the one-live-session-per-device invariant without relying on a
    /// unique index over fingerprints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn replace_for_fingerprint(
        &self,
        user_id: Uuid,
        refresh_token: &str,
        fingerprint: &str,
    ) -> Result<Session, ApiError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sessions WHERE fingerprint = $1")
            .bind(fingerprint)
            .execute(&mut *tx)
            .await?;
        let row = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (user_id, refresh_token, fingerprint) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(refresh_token)
        .bind(fingerprint)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Looks up the session holding the given refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn find_by_token(&self, refresh_token: &str) -> Result<Option<Session>, ApiError> {
        let row = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE refresh_token = $1")
            .bind(refresh_token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Drops the session holding the given refresh token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn delete_by_token(&self, refresh_token: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM sessions WHERE refresh_token = $1")
            .bind(refresh_token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
