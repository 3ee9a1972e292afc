//! Listing entity and the property field set it shares with sell orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use uuid::Uuid;

/// Deal type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealType {
    /// Property sale.
    Sell,
    /// Property rental.
    Rent,
}

impl DealType {
    /// Parses the wire string, if recognized.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sell" => Some(Self::Sell),
            "rent" => Some(Self::Rent),
            _ => None,
        }
    }

    /// Human-readable label used in notification messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sell => "Property sale",
            Self::Rent => "Property rental",
        }
    }
}

/// Property category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Apartment in a residential building.
    Apartment,
    /// Detached house.
    House,
    /// Land plot.
    Land,
    /// Summer cottage.
    Cottage,
    /// Commercial property.
    Business,
    /// Factories and plants.
    Factory,
    /// Townhouse.
    Townhouse,
    /// Anything else.
    Other,
}

impl Category {
    /// Parses the wire string, if recognized.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "apartment" => Some(Self::Apartment),
            "house" => Some(Self::House),
            "land" => Some(Self::Land),
            "cottage" => Some(Self::Cottage),
            "business" => Some(Self::Business),
            "factory" => Some(Self::Factory),
            "townhouse" => Some(Self::Townhouse),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Human-readable label used in feedback titles and notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apartment => "Apartment",
            Self::House => "House",
            Self::Land => "Land plot",
            Self::Cottage => "Cottage",
            Self::Business => "Commercial property",
            Self::Factory => "Factories and plants",
            Self::Townhouse => "Townhouse",
            Self::Other => "Other",
        }
    }
}

/// Listing visibility lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityStatus {
    /// Awaiting moderation; never visible to the public client.
    Checking,
    /// Published.
    Active,
    /// Sold: individually linkable but not listed publicly by default.
    Sold,
    /// Withdrawn.
    Canceled,
}

impl VisibilityStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Active => "active",
            Self::Sold => "sold",
            Self::Canceled => "canceled",
        }
    }
}

/// Embedded location data.
///
/// `house_number` and `map_link` are redacted on public single-record
/// fetches when `is_info_hidden` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPosition {
    /// City name.
    #[serde(default)]
    pub city: Option<String>,
    /// District within the city.
    #[serde(default)]
    pub city_region: Option<String>,
    /// Street name.
    #[serde(default)]
    pub street: Option<String>,
    /// House number (access-restricted when hidden).
    #[serde(default)]
    pub house_number: Option<String>,
    /// Link to a map provider (access-restricted when hidden).
    #[serde(default)]
    pub map_link: Option<String>,
    /// When set, the public client must not see the exact address.
    #[serde(default)]
    pub is_info_hidden: bool,
}

/// Owner contact data. Excluded from query projections for public
/// callers; only the admin service ever fetches these fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInfo {
    /// Owner's name.
    #[serde(default)]
    pub owner_name: Option<String>,
    /// Owner's phone number.
    #[serde(default)]
    pub owner_phone: Option<String>,
    /// Apartment number within the building.
    #[serde(default)]
    pub apartment_number: Option<String>,
    /// Entrance number.
    #[serde(default)]
    pub entrance_number: Option<String>,
    /// Intercom code.
    #[serde(default)]
    pub intercom_number: Option<String>,
    /// Internal notes.
    #[serde(default)]
    pub description: Option<String>,
    /// Comment left by the owner (not restricted).
    #[serde(default)]
    pub owner_comment: Option<String>,
}

/// A stored image: full-size URL plus thumbnail URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePair {
    /// Public URL of the full-size WebP.
    pub image_url: String,
    /// Public URL of the thumbnail WebP.
    pub thumbnail_url: String,
}

/// Field set shared by [`Listing`] and sell orders.
///
/// Derived-filter fields are real columns; the long tail of optional
/// category-specific attributes lives in the `attrs` JSON map and is
/// flattened into the wire representation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFields {
    /// Deal type (`sell`/`rent`), stored as text.
    #[serde(rename = "type")]
    pub deal_type: String,
    /// Property category, stored as text.
    pub category: String,
    /// Asking price.
    pub price: i64,
    /// Free-form description.
    pub description: Option<String>,
    /// Owning agent, when assigned.
    pub estate_agent: Option<Uuid>,
    /// Embedded location data.
    pub geo_position: Option<Json<GeoPosition>>,
    /// Restricted owner contact data.
    pub owner_info: Option<Json<OwnerInfo>>,
    /// Free-shape apartment complex info.
    pub apartment_complex: Option<Value>,
    /// Uploaded images.
    pub images: Json<Vec<ImagePair>>,
    /// Document status (access-restricted).
    pub documents: Option<String>,
    /// Number of rooms, bucketed at 7+ in the domain.
    pub room_count: Option<i32>,
    /// Living area in square meters.
    pub house_square: Option<f64>,
    /// Kitchen area in square meters.
    pub kitchen_square: Option<f64>,
    /// Construction year.
    pub house_building_year: Option<i32>,
    /// Floor the unit is on.
    pub target_floor: Option<i32>,
    /// Total floors in the building, bucketed above 9.
    pub total_floor: Option<i32>,
    /// Unit is not on the first floor.
    pub not_first_floor: Option<bool>,
    /// Unit is not on the last floor.
    pub not_last_floor: Option<bool>,
    /// Remaining optional attributes (materials, utilities, links...),
    /// flattened into the response object.
    #[serde(flatten)]
    pub attrs: Json<Map<String, Value>>,
}

/// A published real-estate object record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Listing identifier.
    pub id: Uuid,
    /// Shared property fields.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: PropertyFields,
    /// Business subtype, commercial listings only.
    pub business_type: Option<String>,
    /// Visibility lifecycle state, stored as text.
    pub visibility_status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Nulls the restricted address fields in place. Applied to public
    /// single-record fetches when the owner asked to hide the address.
    pub fn redact_hidden_geo(&mut self) {
        if let Some(geo) = self.fields.geo_position.as_mut()
            && geo.0.is_info_hidden
        {
            geo.0.house_number = None;
            geo.0.map_link = None;
        }
    }

    /// Whether the public client may fetch this record by id. A listing
    /// "exists" publicly only while active or sold.
    #[must_use]
    pub fn publicly_fetchable(&self) -> bool {
        self.visibility_status == VisibilityStatus::Active.as_str()
            || self.visibility_status == VisibilityStatus::Sold.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_with(status: &str, hidden: bool) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            fields: PropertyFields {
                deal_type: "sell".into(),
                category: "apartment".into(),
                price: 100,
                description: None,
                estate_agent: None,
                geo_position: Some(Json(GeoPosition {
                    city: Some("Almaty".into()),
                    house_number: Some("12".into()),
                    map_link: Some("https://maps.example/12".into()),
                    is_info_hidden: hidden,
                    ..GeoPosition::default()
                })),
                owner_info: None,
                apartment_complex: None,
                images: Json(vec![]),
                documents: None,
                room_count: None,
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
            visibility_status: status.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn hidden_geo_is_redacted() {
        let mut listing = listing_with("active", true);
        listing.redact_hidden_geo();
        let geo = listing.fields.geo_position.as_ref().map(|j| &j.0);
        assert!(geo.is_some_and(|g| g.house_number.is_none() && g.map_link.is_none()));
        // City survives redaction.
        assert!(geo.is_some_and(|g| g.city.is_some()));
    }

    #[test]
    fn visible_geo_is_untouched() {
        let mut listing = listing_with("active", false);
        listing.redact_hidden_geo();
        let geo = listing.fields.geo_position.as_ref().map(|j| &j.0);
        assert!(geo.is_some_and(|g| g.house_number.is_some() && g.map_link.is_some()));
    }

    #[test]
    fn public_fetchability_covers_active_and_sold_only() {
        assert!(listing_with("active", false).publicly_fetchable());
        assert!(listing_with("sold", false).publicly_fetchable());
        assert!(!listing_with("checking", false).publicly_fetchable());
        assert!(!listing_with("canceled", false).publicly_fetchable());
    }

    #[test]
    fn attrs_flatten_into_the_wire_object() {
        let mut listing = listing_with("active", false);
        listing
            .fields
            .attrs
            .0
            .insert("houseCondition".into(), Value::String("good".into()));
        let json = serde_json::to_value(&listing).unwrap_or_default();
        assert_eq!(json["houseCondition"], "good");
        assert_eq!(json["type"], "sell");
    }
}
