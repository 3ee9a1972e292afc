//! Listing repository: dynamic search, CRUD, and order materialization.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::filter::ROOM_BUCKET_THRESHOLD;
use crate::domain::{Audience, Listing, ListingQuery, PropertyFields, TotalFloorClause, VisibilityClause};
use crate::error::ApiError;

/// Shared property columns, in insert order.
const PROPERTY_COLUMNS: &str = "deal_type, category, price, description, estate_agent, \
     geo_position, owner_info, apartment_complex, images, documents, room_count, \
     house_square, kitchen_square, house_building_year, target_floor, total_floor, \
     not_first_floor, not_last_floor, attrs";

/// Full projection for the admin service.
const SELECT_ADMIN: &str = "SELECT id, deal_type, category, business_type, visibility_status, \
     price, description, estate_agent, geo_position, owner_info, apartment_complex, images, \
     documents, room_count, house_square, kitchen_square, house_building_year, target_floor, \
     total_floor, not_first_floor, not_last_floor, attrs, created_at, updated_at FROM listings";

/// Public projection: `owner_info` and `documents` are never fetched,
/// only substituted with NULL at the query level.
const SELECT_PUBLIC: &str = "SELECT id, deal_type, category, business_type, visibility_status, \
     price, description, estate_agent, geo_position, NULL::jsonb AS owner_info, \
     apartment_complex, images, NULL::text AS documents, room_count, house_square, \
     kitchen_square, house_building_year, target_floor, total_floor, not_first_floor, \
     not_last_floor, attrs, created_at, updated_at FROM listings";

/// Returns the projection for the caller's audience.
const fn projection(audience: Audience) -> &'static str {
    match audience {
        Audience::AdminService => SELECT_ADMIN,
        Audience::Public => SELECT_PUBLIC,
    }
}

/// PostgreSQL-backed listing repository.
#[derive(Debug, Clone)]
pub struct ListingRepo {
    pool: PgPool,
}

impl ListingRepo {
    /// Creates a repository over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs a validated [`ListingQuery`], newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn search(
        &self,
        query: &ListingQuery,
        audience: Audience,
    ) -> Result<Vec<Listing>, ApiError> {
        let mut qb = build_search_query(query, audience);
        let rows = qb
            .build_query_as::<Listing>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Fetches a single listing by id with the audience's projection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn find_by_id(
        &self,
        id: Uuid,
        audience: Audience,
    ) -> Result<Option<Listing>, ApiError> {
        let sql = format!("{} WHERE id = $1", projection(audience));
        let row = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Inserts a new listing. Visibility defaults to `checking` when
    /// not supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn insert(
        &self,
        fields: &PropertyFields,
        business_type: Option<&str>,
        visibility_status: Option<&str>,
    ) -> Result<Listing, ApiError> {
        let sql = format!(
            "INSERT INTO listings ({PROPERTY_COLUMNS}, business_type, visibility_status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                     $17, $18, $19, $20, COALESCE($21, 'checking')) \
             RETURNING *"
        );
        let row = bind_property_fields(sqlx::query_as::<_, Listing>(&sql), fields)
            .bind(business_type)
            .bind(visibility_status)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Replaces a listing's property fields; `business_type` and
    /// `visibility_status` keep their current values when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn update(
        &self,
        id: Uuid,
        fields: &PropertyFields,
        business_type: Option<&str>,
        visibility_status: Option<&str>,
    ) -> Result<Option<Listing>, ApiError> {
        let sql = "UPDATE listings SET \
             deal_type = $1, category = $2, price = $3, description = $4, estate_agent = $5, \
             geo_position = $6, owner_info = $7, apartment_complex = $8, images = $9, \
             documents = $10, room_count = $11, house_square = $12, kitchen_square = $13, \
             house_building_year = $14, target_floor = $15, total_floor = $16, \
             not_first_floor = $17, not_last_floor = $18, attrs = $19, \
             business_type = COALESCE($20, business_type), \
             visibility_status = COALESCE($21, visibility_status), \
             updated_at = now() \
             WHERE id = $22 RETURNING *";
        let row = bind_property_fields(sqlx::query_as::<_, Listing>(sql), fields)
            .bind(business_type)
            .bind(visibility_status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Materializes a listing from a sell order's property fields.
    /// The new listing starts in `checking`, like any other creation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn insert_from_order(&self, fields: &PropertyFields) -> Result<Listing, ApiError> {
        self.insert(fields, None, None).await
    }

    /// Deletes a listing, returning the removed row.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn delete(&self, id: Uuid) -> Result<Option<Listing>, ApiError> {
        let row = sqlx::query_as::<_, Listing>("DELETE FROM listings WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

/// Binds the shared property columns in [`PROPERTY_COLUMNS`] order.
fn bind_property_fields<'q>(
    query: sqlx::query::QueryAs<'q, Postgres, Listing, sqlx::postgres::PgArguments>,
    fields: &'q PropertyFields,
) -> sqlx::query::QueryAs<'q, Postgres, Listing, sqlx::postgres::PgArguments> {
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

/// Renders a [`ListingQuery`] into SQL. Pure function so the generated
/// clauses are testable without a database.
fn build_search_query(
    query: &ListingQuery,
    audience: Audience,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(projection(audience));
    qb.push(" WHERE ");

    match &query.visibility {
        VisibilityClause::Exactly(status) => {
            qb.push("visibility_status = ").push_bind(status.clone());
        }
        VisibilityClause::AnyOf(statuses) => {
            qb.push("visibility_status = ANY(")
                .push_bind(statuses.clone())
                .push(")");
        }
    }

    for (lvalue, value) in &query.pass_through {
        qb.push(" AND ")
            .push(*lvalue)
            .push(" = ")
            .push_bind(value.clone());
    }

    if let Some(min) = query.price_min {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = query.price_max {
        qb.push(" AND price <= ").push_bind(max);
    }

    if !query.room_counts.is_empty() {
        qb.push(" AND (room_count = ANY(")
            .push_bind(query.room_counts.clone())
            .push(")");
        if query.rooms_seven_plus {
            qb.push(" OR room_count >= ").push_bind(ROOM_BUCKET_THRESHOLD);
        }
        qb.push(")");
    }

    if query.not_first_floor {
        qb.push(" AND not_first_floor = TRUE");
    }
    if query.not_last_floor {
        qb.push(" AND not_last_floor = TRUE");
    }
    if let Some(floor) = query.target_floor {
        qb.push(" AND target_floor = ").push_bind(floor);
    }
    match query.total_floor {
        Some(TotalFloorClause::Exact(n)) => {
            qb.push(" AND total_floor = ").push_bind(n);
        }
        Some(TotalFloorClause::Above(n)) => {
            qb.push(" AND total_floor > ").push_bind(n);
        }
        None => {}
    }

    if let Some(min) = query.house_square_min {
        qb.push(" AND house_square >= ").push_bind(min);
    }
    if let Some(max) = query.house_square_max {
        qb.push(" AND house_square <= ").push_bind(max);
    }
    if let Some(min) = query.kitchen_square_min {
        qb.push(" AND kitchen_square >= ").push_bind(min);
    }
    if let Some(year) = query.building_year_min {
        qb.push(" AND house_building_year >= ").push_bind(year);
    }

    if let Some(city) = &query.city {
        qb.push(" AND geo_position ->> 'city' = ").push_bind(city.clone());
    }
    if let Some(region) = &query.city_region {
        qb.push(" AND geo_position ->> 'cityRegion' = ")
            .push_bind(region.clone());
    }
    if let Some(street) = &query.street_search {
        qb.push(" AND geo_position ->> 'street' ILIKE ")
            .push_bind(format!("%{street}%"));
    }

    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.offset());
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn query_from(pairs: &[(&str, &str)], audience: Audience) -> ListingQuery {
        let params: HashMap<String, String> = pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ListingQuery::from_params(&params, audience)
    }

    #[test]
    fn public_projection_never_fetches_owner_info() {
        let query = query_from(&[], Audience::Public);
        let qb = build_search_query(&query, Audience::Public);
        let sql = qb.sql();
        assert!(sql.contains("NULL::jsonb AS owner_info"));
        assert!(sql.contains("NULL::text AS documents"));

        let qb = build_search_query(&query, Audience::AdminService);
        assert!(!qb.sql().contains("NULL::jsonb"));
    }

    #[test]
    fn room_bucket_renders_an_or_clause() {
        let query = query_from(&[("roomCount", "3,7")], Audience::Public);
        let qb = build_search_query(&query, Audience::Public);
        let sql = qb.sql();
        assert!(sql.contains("room_count = ANY("));
        assert!(sql.contains("OR room_count >= "));
    }

    #[test]
    fn total_floor_above_nine_renders_strict_greater() {
        let query = query_from(&[("totalFloor", "12")], Audience::Public);
        let qb = build_search_query(&query, Audience::Public);
        assert!(qb.sql().contains("total_floor > "));

        let query = query_from(&[("totalFloor", "5")], Audience::Public);
        let qb = build_search_query(&query, Audience::Public);
        assert!(qb.sql().contains("total_floor = "));
    }

    #[test]
    fn street_search_is_case_insensitive_substring() {
        let query = query_from(&[("searchStreet", "abay")], Audience::Public);
        let qb = build_search_query(&query, Audience::Public);
        assert!(qb.sql().contains("geo_position ->> 'street' ILIKE "));
    }

    #[test]
    fn pass_through_clauses_target_declared_lvalues() {
        let query = query_from(
            &[("houseCondition", "good"), ("type", "sell")],
            Audience::Public,
        );
        let qb = build_search_query(&query, Audience::Public);
        let sql = qb.sql();
        assert!(sql.contains("attrs ->> 'houseCondition' = "));
        assert!(sql.contains("deal_type = "));
    }

    #[test]
    fn results_are_paginated_and_sorted_newest_first() {
        let query = query_from(&[("page", "2"), ("limit", "10")], Audience::Public);
        let qb = build_search_query(&query, Audience::Public);
        assert!(qb.sql().contains("ORDER BY created_at DESC LIMIT "));
    }
}
