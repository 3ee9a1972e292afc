//! Persistence layer: PostgreSQL repositories over a shared pool.
//!
//! One repository per aggregate. All of them hold a cheap clone of the
//! single `sqlx::PgPool` constructed at startup.

pub mod failed_uploads;
pub mod feedbacks;
pub mod listings;
pub mod sell_orders;
pub mod sessions;
pub mod users;

pub use failed_uploads::FailedUploadRepo;
pub use feedbacks::FeedbackRepo;
pub use listings::ListingRepo;
pub use sell_orders::SellOrderRepo;
pub use sessions::SessionRepo;
pub use users::UserRepo;

use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::error::ApiError;

/// Connects to PostgreSQL and runs embedded migrations.
///
/// # Errors
///
/// Returns [`ApiError::Database`] when the pool cannot be created or a
/// migration fails.
pub async fn connect(config: &AppConfig) -> Result<sqlx::PgPool, ApiError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database_connect_timeout_secs,
        ))
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| ApiError::Internal(format!("migration failed: {e}")))?;

    Ok(pool)
}
