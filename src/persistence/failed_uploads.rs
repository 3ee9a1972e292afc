//! Append-only log of image upload failures.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::error::ApiError;

/// One recorded upload failure.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpload {
    /// Row id.
    pub id: i64,
    /// Client-supplied file name of the rejected upload.
    pub original_name: String,
    /// Short failure reason.
    pub reason: String,
    /// When the failure was recorded.
    pub created_at: DateTime<Utc>,
}

/// Repository over the failure log. Writes never fail the surrounding
/// request: callers log and move on.
#[derive(Debug, Clone)]
pub struct FailedUploadRepo {
    pool: PgPool,
}

impl FailedUploadRepo {
    /// Creates a repository over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records one failure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn insert(&self, original_name: &str, reason: &str) -> Result<(), ApiError> {
        sqlx::query("INSERT INTO failed_uploads (original_name, reason) VALUES ($1, $2)")
            .bind(original_name)
            .bind(reason)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Lists recorded failures, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn list(&self) -> Result<Vec<FailedUpload>, ApiError> {
        let rows = sqlx::query_as::<_, FailedUpload>(
            "SELECT * FROM failed_uploads ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
