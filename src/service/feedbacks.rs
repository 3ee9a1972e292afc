//! Feedback service: lead capture with denormalized listing context.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{Audience, Category, Feedback, Listing};
use crate::error::ApiError;
use crate::notify::TelegramNotifier;
use crate::persistence::{FeedbackRepo, ListingRepo};

/// Fields accepted on feedback update. Absent fields keep their value.
#[derive(Debug, Default)]
pub struct FeedbackUpdate {
    /// Lead's name.
    pub name: Option<String>,
    /// Lead's phone.
    pub phone: Option<String>,
    /// Lifecycle status.
    pub status: Option<String>,
    /// Re-targeted listing; re-derives title and agent.
    pub estate_id: Option<Uuid>,
    /// Free-form message.
    pub description: Option<String>,
}

/// Orchestration layer for lead operations.
#[derive(Debug, Clone)]
pub struct FeedbackService {
    feedbacks: FeedbackRepo,
    listings: ListingRepo,
    notifier: Arc<TelegramNotifier>,
}

impl FeedbackService {
    /// Creates a new `FeedbackService`.
    #[must_use]
    pub fn new(
        feedbacks: FeedbackRepo,
        listings: ListingRepo,
        notifier: Arc<TelegramNotifier>,
    ) -> Self {
        Self {
            feedbacks,
            listings,
            notifier,
        }
    }

    /// Lists leads; defaults to open ones when no status is given.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on repository failure.
    pub async fn list(
        &self,
        status: Option<&str>,
        estate_id: Option<Uuid>,
    ) -> Result<Vec<Feedback>, ApiError> {
        self.feedbacks.list(status, estate_id).await
    }

    /// Fetches one lead.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when absent.
    pub async fn get(&self, id: Uuid) -> Result<Feedback, ApiError> {
        self.feedbacks
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("feedback not found".into()))
    }

    /// Captures a new lead. When it references a listing, the title and
    /// the responsible agent are denormalized from the listing at this
    /// moment and then frozen.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for a dangling listing reference.
    pub async fn create(
        &self,
        name: &str,
        phone: &str,
        estate_id: Option<Uuid>,
        description: Option<&str>,
    ) -> Result<Feedback, ApiError> {
        let (title, estate_agent) = self.listing_context(estate_id).await?;
        let feedback = self
            .feedbacks
            .insert(
                name,
                phone,
                estate_id,
                description,
                estate_agent,
                title.as_deref(),
            )
            .await?;
        self.notifier.feedback_created(&feedback).await;
        info!(id = %feedback.id, "feedback created");
        Ok(feedback)
    }

    /// Updates a lead. The frozen title and agent are re-derived on
    /// every update from whichever listing the lead references after
    /// it, so a status-only change still picks up listing edits.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the lead is absent or the
    /// listing reference is dangling.
    pub async fn update(&self, id: Uuid, update: FeedbackUpdate) -> Result<Feedback, ApiError> {
        let current = self.get(id).await?;
        let estate_ref = update.estate_id.or(current.estate_id);
        let (title, estate_agent) = self.listing_context(estate_ref).await?;
        self.feedbacks
            .update(
                id,
                update.name.as_deref(),
                update.phone.as_deref(),
                update.status.as_deref(),
                update.estate_id,
                update.description.as_deref(),
                estate_agent,
                title.as_deref(),
            )
            .await?
            .ok_or_else(|| ApiError::NotFound("feedback not found".into()))
    }

    /// Deletes a lead.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when absent.
    pub async fn delete(&self, id: Uuid) -> Result<Feedback, ApiError> {
        self.feedbacks
            .delete(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("feedback not found".into()))
    }

    /// Title and agent derived from the referenced listing. A lead
    /// without a reference carries no context; a dangling reference is
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the referenced listing does
    /// not exist.
    async fn listing_context(
        &self,
        estate_id: Option<Uuid>,
    ) -> Result<(Option<String>, Option<Uuid>), ApiError> {
        let Some(estate_id) = estate_id else {
            return Ok((None, None));
        };
        let listing = self
            .listings
            .find_by_id(estate_id, Audience::AdminService)
            .await?
            .ok_or_else(|| ApiError::NotFound("estate object not found".into()))?;
        Ok((Some(listing_title(&listing)), listing.fields.estate_agent))
    }
}

/// `2-room Apartment, Almaty, Abay 12` from whatever parts the listing
/// has.
fn listing_title(listing: &Listing) -> String {
    let category = Category::parse(&listing.fields.category).map_or("Other", Category::label);
    let mut title = match listing.fields.room_count {
        Some(rooms) => format!("{rooms}-room {category}"),
        None => category.to_owned(),
    };
    if let Some(geo) = listing.fields.geo_position.as_deref() {
        if let Some(city) = geo.city.as_deref().filter(|s| !s.is_empty()) {
            title.push_str(", ");
            title.push_str(city);
        }
        if let Some(street) = geo.street.as_deref().filter(|s| !s.is_empty()) {
            title.push_str(", ");
            title.push_str(street);
            if let Some(number) = geo.house_number.as_deref().filter(|s| !s.is_empty()) {
                title.push(' ');
                title.push_str(number);
            }
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPosition, PropertyFields};
    use chrono::Utc;
    use serde_json::Map;
    use sqlx::types::Json;

    fn listing(rooms: Option<i32>, geo: Option<GeoPosition>) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            fields: PropertyFields {
                deal_type: "sell".into(),
                category: "apartment".into(),
                price: 1,
                description: None,
                estate_agent: None,
                geo_position: geo.map(Json),
                owner_info: None,
                apartment_complex: None,
                images: Json(vec![]),
                documents: None,
                room_count: rooms,
                house_square: None,
                kitchen_square: None,
                house_building_year: None,
                target_floor: None,
                total_floor: None,
                not_first_floor: None,
                not_last_floor: None,
                attrs: Json(Map::new()),
            },
            business_type: None,
            visibility_status: "active".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn title_with_full_address() {
        let listing = listing(
            Some(2),
            Some(GeoPosition {
                city: Some("Almaty".into()),
                street: Some("Abay".into()),
                house_number: Some("12".into()),
                ..GeoPosition::default()
            }),
        );
        assert_eq!(listing_title(&listing), "2-room Apartment, Almaty, Abay 12");
    }

    #[test]
    fn title_without_rooms_or_geo_is_just_the_category() {
        assert_eq!(listing_title(&listing(None, None)), "Apartment");
    }

    #[test]
    fn house_number_is_skipped_without_a_street() {
        let listing = listing(
            Some(3),
            Some(GeoPosition {
                city: Some("Astana".into()),
                house_number: Some("7".into()),
                ..GeoPosition::default()
            }),
        );
        assert_eq!(listing_title(&listing), "3-room Apartment, Astana");
    }
}
