//! Feedback repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Feedback;
use crate::error::ApiError;

/// PostgreSQL-backed feedback repository.
#[derive(Debug, Clone)]
pub struct FeedbackRepo {
    pool: PgPool,
}

/// Columns accepted on insert.
const INSERT_COLUMNS: &str = "name, phone, estate_id, description, estate_agent, title";

impl FeedbackRepo {
    /// Creates a repository over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new lead in status `new`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn insert(
        &self,
        name: &str,
        phone: &str,
        estate_id: Option<Uuid>,
        description: Option<&str>,
        estate_agent: Option<Uuid>,
        title: Option<&str>,
    ) -> Result<Feedback, ApiError> {
        let sql = format!(
            "INSERT INTO feedbacks ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *"
        );
        let row = sqlx::query_as::<_, Feedback>(&sql)
            .bind(name)
            .bind(phone)
            .bind(estate_id)
            .bind(description)
            .bind(estate_agent)
            .bind(title)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Fetches a single feedback.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Feedback>, ApiError> {
        let row = sqlx::query_as::<_, Feedback>("SELECT * FROM feedbacks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Lists feedbacks newest first. Without an explicit status the
    /// result covers open leads only (`new` and `inWork`); closed leads
    /// must be asked for by status. An `estate_id` narrows to leads on
    /// one listing.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn list(
        &self,
        status: Option<&str>,
        estate_id: Option<Uuid>,
    ) -> Result<Vec<Feedback>, ApiError> {
        let mut qb = sqlx::QueryBuilder::new("SELECT * FROM feedbacks WHERE ");
        match status {
            Some(status) => {
                qb.push("status = ");
                qb.push_bind(status.to_owned());
            }
            None => {
                qb.push("status = ANY(ARRAY['new', 'inWork'])");
            }
        }
        if let Some(estate_id) = estate_id {
            qb.push(" AND estate_id = ");
            qb.push_bind(estate_id);
        }
        qb.push(" ORDER BY created_at DESC");
        let rows = qb
            .build_query_as::<Feedback>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Updates a lead; absent values keep the current column.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        phone: Option<&str>,
        status: Option<&str>,
        estate_id: Option<Uuid>,
        description: Option<&str>,
        estate_agent: Option<Uuid>,
        title: Option<&str>,
    ) -> Result<Option<Feedback>, ApiError> {
        let row = sqlx::query_as::<_, Feedback>(
            "UPDATE feedbacks SET \
             name = COALESCE($2, name), \
             phone = COALESCE($3, phone), \
             status = COALESCE($4, status), \
             estate_id = COALESCE($5, estate_id), \
             description = COALESCE($6, description), \
             estate_agent = COALESCE($7, estate_agent), \
             title = COALESCE($8, title), \
             updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(status)
        .bind(estate_id)
        .bind(description)
        .bind(estate_agent)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Deletes a lead, returning the removed row.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn delete(&self, id: Uuid) -> Result<Option<Feedback>, ApiError> {
        let row = sqlx::query_as::<_, Feedback>("DELETE FROM feedbacks WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
