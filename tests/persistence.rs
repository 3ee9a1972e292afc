//! Database-backed workflow tests.
//!
//! Each test runs against a fresh schema created from `migrations/`
//! by `sqlx::test`, which requires a reachable PostgreSQL behind
//! `DATABASE_URL`.

use std::sync::Arc;

use serde_json::Map;
use sqlx::PgPool;
use sqlx::types::Json;

use estate_api::domain::{Audience, GeoPosition, PropertyFields};
use estate_api::error::ApiError;
use estate_api::notify::TelegramNotifier;
use estate_api::persistence::{FeedbackRepo, ListingRepo, SellOrderRepo};
use estate_api::service::{FeedbackService, FeedbackUpdate};

fn property_fields(city: &str) -> PropertyFields {
    PropertyFields {
        deal_type: "sell".into(),
        category: "apartment".into(),
        price: 25_000_000,
        description: None,
        estate_agent: None,
        geo_position: Some(Json(GeoPosition {
            city: Some(city.into()),
            street: Some("Abay".into()),
            house_number: Some("12".into()),
            ..GeoPosition::default()
        })),
        owner_info: None,
        apartment_complex: None,
        images: Json(vec![]),
        documents: None,
        room_count: Some(2),
        house_square: None,
        kitchen_square: None,
        house_building_year: None,
        target_floor: None,
        total_floor: None,
        not_first_floor: None,
        not_last_floor: None,
        attrs: Json(Map::new()),
    }
}

#[sqlx::test]
async fn sell_order_completion_claims_the_transition_once(pool: PgPool) -> Result<(), ApiError> {
    let orders = SellOrderRepo::new(pool);
    let order = orders.insert(&property_fields("Almaty")).await?;

    assert!(orders.complete_if_pending(order.id).await?);
    let completed = orders.find_by_id(order.id, Audience::AdminService).await?;
    assert!(completed.is_some_and(|o| o.status == "completed"));

    // The transition is exclusive; repeating it claims nothing.
    assert!(!orders.complete_if_pending(order.id).await?);
    Ok(())
}

#[sqlx::test]
async fn feedback_title_follows_the_referenced_listing_on_update(
    pool: PgPool,
) -> Result<(), ApiError> {
    let listings = ListingRepo::new(pool.clone());
    let feedbacks = FeedbackService::new(
        FeedbackRepo::new(pool.clone()),
        listings.clone(),
        Arc::new(TelegramNotifier::disabled()),
    );

    let listing = listings
        .insert(&property_fields("Almaty"), None, Some("active"))
        .await?;
    let lead = feedbacks
        .create("Aigerim", "+7 700 000 00 00", Some(listing.id), None)
        .await?;
    assert!(lead.title.as_deref().unwrap_or_default().contains("Almaty"));

    // The listing moves city; a status-only triage update must pick
    // the change up rather than keep the stale frozen title.
    sqlx::query(
        "UPDATE listings SET geo_position = \
         jsonb_set(geo_position, '{city}', '\"Astana\"'::jsonb) WHERE id = $1",
    )
    .bind(listing.id)
    .execute(&pool)
    .await?;

    let updated = feedbacks
        .update(
            lead.id,
            FeedbackUpdate {
                status: Some("inWork".into()),
                ..FeedbackUpdate::default()
            },
        )
        .await?;
    assert_eq!(updated.status, "inWork");
    assert!(
        updated
            .title
            .as_deref()
            .unwrap_or_default()
            .contains("Astana"),
        "title was {:?}",
        updated.title
    );
    Ok(())
}
