//! User repository.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::User;
use crate::error::ApiError;

/// PostgreSQL-backed user repository.
#[derive(Debug, Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    /// Creates a repository over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches a user by login name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Fetches a user by email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Fetches a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Lists all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        let rows = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Inserts a new user record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure, including
    /// unique violations on `username`/`email`.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        name: &str,
        email: Option<&str>,
        username: &str,
        role: &str,
        password_hash: &str,
        avatar: Option<&str>,
        phone: &str,
        birthday: Option<NaiveDate>,
    ) -> Result<User, ApiError> {
        let row = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, username, role, password_hash, avatar, phone, birthday) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(name)
        .bind(email)
        .bind(username)
        .bind(role)
        .bind(password_hash)
        .bind(avatar)
        .bind(phone)
        .bind(birthday)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Updates a user's profile; absent values keep the current column.
    /// The role column is always written: role resolution happens in
    /// the service layer before this call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        username: Option<&str>,
        role: &str,
        password_hash: Option<&str>,
        avatar: Option<&str>,
        phone: Option<&str>,
        birthday: Option<NaiveDate>,
    ) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, User>(
            "UPDATE users SET \
             name = COALESCE($2, name), \
             email = COALESCE($3, email), \
             username = COALESCE($4, username), \
             role = $5, \
             password_hash = COALESCE($6, password_hash), \
             avatar = COALESCE($7, avatar), \
             phone = COALESCE($8, phone), \
             birthday = COALESCE($9, birthday), \
             updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(username)
        .bind(role)
        .bind(password_hash)
        .bind(avatar)
        .bind(phone)
        .bind(birthday)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Deletes a user, returning the removed row. Sessions cascade.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn delete(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, User>("DELETE FROM users WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
