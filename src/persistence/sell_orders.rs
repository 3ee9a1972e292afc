//! Sell order repository, including the conditional completion update.

use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::domain::{Audience, PropertyFields, SellOrder};
use crate::error::ApiError;

/// Shared property columns, in insert order.
const PROPERTY_COLUMNS: &str = "deal_type, category, price, description, estate_agent, \
     geo_position, owner_info, apartment_complex, images, documents, room_count, \
     house_square, kitchen_square, house_building_year, target_floor, total_floor, \
     not_first_floor, not_last_floor, attrs";

/// Full projection for the admin service.
const SELECT_ADMIN: &str = "SELECT id, deal_type, category, status, decline_reason, \
     created_object_id, price, description, estate_agent, geo_position, owner_info, \
     apartment_complex, images, documents, room_count, house_square, kitchen_square, \
     house_building_year, target_floor, total_floor, not_first_floor, not_last_floor, \
     attrs, created_at, updated_at FROM sell_orders";

/// Public projection: owner contact data is never fetched.
const SELECT_PUBLIC: &str = "SELECT id, deal_type, category, status, decline_reason, \
     created_object_id, price, description, estate_agent, geo_position, \
     NULL::jsonb AS owner_info, apartment_complex, images, documents, room_count, \
     house_square, kitchen_square, house_building_year, target_floor, total_floor, \
     not_first_floor, not_last_floor, attrs, created_at, updated_at FROM sell_orders";

const fn projection(audience: Audience) -> &'static str {
    match audience {
        Audience::AdminService => SELECT_ADMIN,
        Audience::Public => SELECT_PUBLIC,
    }
}

/// PostgreSQL-backed sell order repository.
#[derive(Debug, Clone)]
pub struct SellOrderRepo {
    pool: PgPool,
}

impl SellOrderRepo {
    /// Creates a repository over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new intake order in status `new`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn insert(&self, fields: &PropertyFields) -> Result<SellOrder, ApiError> {
        let sql = format!(
            "INSERT INTO sell_orders ({PROPERTY_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                     $17, $18, $19) \
             RETURNING *"
        );
        let row = bind_property_fields(sqlx::query_as::<_, SellOrder>(&sql), fields)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Fetches a single order with the audience's projection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn find_by_id(
        &self,
        id: Uuid,
        audience: Audience,
    ) -> Result<Option<SellOrder>, ApiError> {
        let sql = format!("{} WHERE id = $1", projection(audience));
        let row = sqlx::query_as::<_, SellOrder>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Lists orders, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn list(
        &self,
        status: Option<&str>,
        audience: Audience,
    ) -> Result<Vec<SellOrder>, ApiError> {
        let rows = match status {
            Some(status) => {
                let sql = format!(
                    "{} WHERE status = $1 ORDER BY created_at DESC",
                    projection(audience)
                );
                sqlx::query_as::<_, SellOrder>(&sql)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{} ORDER BY created_at DESC", projection(audience));
                sqlx::query_as::<_, SellOrder>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Replaces an order's property fields; `status` and
    /// `decline_reason` keep their current values when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn update(
        &self,
        id: Uuid,
        fields: &PropertyFields,
        status: Option<&str>,
        decline_reason: Option<&str>,
    ) -> Result<Option<SellOrder>, ApiError> {
        let sql = "UPDATE sell_orders SET \
             deal_type = $1, category = $2, price = $3, description = $4, estate_agent = $5, \
             geo_position = $6, owner_info = $7, apartment_complex = $8, images = $9, \
             documents = $10, room_count = $11, house_square = $12, kitchen_square = $13, \
             house_building_year = $14, target_floor = $15, total_floor = $16, \
             not_first_floor = $17, not_last_floor = $18, attrs = $19, \
             status = COALESCE($20, status), \
             decline_reason = COALESCE($21, decline_reason), \
             updated_at = now() \
             WHERE id = $22 RETURNING *";
        let row = bind_property_fields(sqlx::query_as::<_, SellOrder>(sql), fields)
            .bind(status)
            .bind(decline_reason)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Claims the completion transition: moves the order to `completed`
    /// only if it is not completed yet, atomically. Returns whether the
    /// transition actually occurred, so the listing materialization can
    /// be gated on a true exclusive transition instead of a prior read.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn complete_if_pending(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "UPDATE sell_orders SET status = 'completed', updated_at = now() \
             WHERE id = $1 AND status <> 'completed'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Records the materialized listing's id on a completed order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn set_created_object(&self, id: Uuid, listing_id: Uuid) -> Result<(), ApiError> {
        sqlx::query("UPDATE sell_orders SET created_object_id = $2 WHERE id = $1")
            .bind(id)
            .bind(listing_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Deletes an order, returning the removed row.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn delete(&self, id: Uuid) -> Result<Option<SellOrder>, ApiError> {
        let row =
            sqlx::query_as::<_, SellOrder>("DELETE FROM sell_orders WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }
}

/// Binds the shared property columns in [`PROPERTY_COLUMNS`] order.
fn bind_property_fields<'q>(
    query: sqlx::query::QueryAs<'q, Postgres, SellOrder, sqlx::postgres::PgArguments>,
    fields: &'q PropertyFields,
) -> sqlx::query::QueryAs<'q, Postgres, SellOrder, sqlx::postgres::PgArguments> {
    query
        .bind(&fields.deal_type)
        .bind(&fields.category)
        .bind(fields.price)
        .bind(&fields.description)
        .bind(fields.estate_agent)
        .bind(&fields.geo_position)
        .bind(&fields.owner_info)
        .bind(&fields.apartment_complex)
        .bind(&fields.images)
        .bind(&fields.documents)
        .bind(fields.room_count)
        .bind(fields.house_square)
        .bind(fields.kitchen_square)
        .bind(fields.house_building_year)
        .bind(fields.target_floor)
        .bind(fields.total_floor)
        .bind(fields.not_first_floor)
        .bind(fields.not_last_floor)
        .bind(&fields.attrs)
}
