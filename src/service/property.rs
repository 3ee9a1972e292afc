//! Parsing of the flexible property payload shared by listings and
//! sell orders.
//!
//! The clients submit multipart forms whose text fields arrive as
//! strings, and admin updates may submit typed JSON. Known fields are
//! pulled out and coerced; everything left over lands in the free-form
//! attribute map, preserving whatever category-specific fields the
//! client sent.

use serde_json::{Map, Value};
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::{Category, DealType, GeoPosition, ImagePair, OwnerInfo, PropertyFields};
use crate::error::ApiError;

/// One file part of a multipart submission.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Client-supplied file name.
    pub original_name: String,
    /// Raw payload.
    pub data: axum::body::Bytes,
}

/// The parsed property payload, before images are attached.
#[derive(Debug)]
pub struct ParsedProperty {
    /// Shared property fields with an empty image list.
    pub fields: PropertyFields,
    /// Listing-only: commercial subtype.
    pub business_type: Option<String>,
    /// Listing-only: requested visibility state.
    pub visibility_status: Option<String>,
    /// Order-only: requested lifecycle status.
    pub status: Option<String>,
    /// Order-only: decline reason.
    pub decline_reason: Option<String>,
    /// Update flows: the image set the client wants to keep.
    pub existing_images: Option<Vec<ImagePair>>,
}

/// Parses the payload map, consuming it. Unknown keys become free-form
/// attributes rather than errors.
///
/// # Errors
///
/// Returns [`ApiError::Unprocessable`] for missing/uncastable required
/// fields and [`ApiError::Conflict`] for malformed nested JSON in
/// `geoPosition`, `ownerInfo` or `existingImages`.
pub fn parse_property(mut payload: Map<String, Value>) -> Result<ParsedProperty, ApiError> {
    let deal_type = take_string(&mut payload, "type")
        .ok_or_else(|| ApiError::Unprocessable("type is required".into()))?;
    if DealType::parse(&deal_type).is_none() {
        return Err(ApiError::Unprocessable("type must be sell or rent".into()));
    }
    let category = take_string(&mut payload, "category")
        .ok_or_else(|| ApiError::Unprocessable("category is required".into()))?;
    if Category::parse(&category).is_none() {
        return Err(ApiError::Unprocessable("unknown category".into()));
    }
    let price = take_i64(&mut payload, "price")?
        .ok_or_else(|| ApiError::Unprocessable("price is required".into()))?;

    let estate_agent = match take_string(&mut payload, "estateAgent") {
        Some(raw) => Some(
            Uuid::parse_str(&raw)
                .map_err(|_| ApiError::Unprocessable("estateAgent must be a uuid".into()))?,
        ),
        None => None,
    };

    // Strict nested-JSON fields: a malformed value is a client error.
    let geo_position = take_nested::<GeoPosition>(&mut payload, "geoPosition")?.map(Json);
    let owner_info = take_nested::<OwnerInfo>(&mut payload, "ownerInfo")?.map(Json);
    let existing_images = take_nested::<Vec<ImagePair>>(&mut payload, "existingImages")?;
    // Free-shape field: a malformed value is silently dropped.
    let apartment_complex = payload
        .remove("apartmentComplex")
        .and_then(|v| match v {
            Value::String(s) => serde_json::from_str::<Value>(&s).ok(),
            other => Some(other),
        })
        .filter(|v| !v.is_null());

    let fields = PropertyFields {
        deal_type,
        category,
        price,
        description: take_string(&mut payload, "description"),
        estate_agent,
        geo_position,
        owner_info,
        apartment_complex,
        images: Json(Vec::new()),
        documents: take_string(&mut payload, "documents"),
        room_count: take_i32(&mut payload, "roomCount")?,
        house_square: take_f64(&mut payload, "houseSquare")?,
        kitchen_square: take_f64(&mut payload, "kitchenSquare")?,
        house_building_year: take_i32(&mut payload, "houseBuildingYear")?,
        target_floor: take_i32(&mut payload, "targetFloor")?,
        total_floor: take_i32(&mut payload, "totalFloor")?,
        not_first_floor: take_bool(&mut payload, "notFirstFloor"),
        not_last_floor: take_bool(&mut payload, "notLastFloor"),
        attrs: Json(Map::new()),
    };

    let business_type = take_string(&mut payload, "businessType");
    let visibility_status = take_string(&mut payload, "visibilityStatus");
    let status = take_string(&mut payload, "status");
    let decline_reason = take_string(&mut payload, "declineReason");

    let mut parsed = ParsedProperty {
        fields,
        business_type,
        visibility_status,
        status,
        decline_reason,
        existing_images,
    };
    // The long tail of optional attributes keeps whatever shape the
    // client sent.
    parsed.fields.attrs = Json(payload);
    Ok(parsed)
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn take_i64(map: &mut Map<String, Value>, key: &str) -> Result<Option<i64>, ApiError> {
    match take_string(map, key) {
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::Unprocessable(format!("{key} must be an integer"))),
        None => Ok(None),
    }
}

fn take_i32(map: &mut Map<String, Value>, key: &str) -> Result<Option<i32>, ApiError> {
    match take_string(map, key) {
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ApiError::Unprocessable(format!("{key} must be an integer"))),
        None => Ok(None),
    }
}

fn take_f64(map: &mut Map<String, Value>, key: &str) -> Result<Option<f64>, ApiError> {
    match take_string(map, key) {
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ApiError::Unprocessable(format!("{key} must be a number"))),
        None => Ok(None),
    }
}

fn take_bool(map: &mut Map<String, Value>, key: &str) -> Option<bool> {
    match map.remove(key)? {
        Value::Bool(b) => Some(b),
        Value::String(s) => Some(s == "true"),
        _ => None,
    }
}

/// Deserializes a nested field that may arrive as a JSON string (from
/// multipart) or as an embedded object (from a JSON body).
fn take_nested<T: serde::de::DeserializeOwned>(
    map: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<T>, ApiError> {
    let Some(raw) = map.remove(key) else {
        return Ok(None);
    };
    let parsed = match raw {
        Value::Null => return Ok(None),
        Value::String(s) => serde_json::from_str::<T>(&s),
        other => serde_json::from_value::<T>(other),
    };
    parsed
        .map(Some)
        .map_err(|_| ApiError::Conflict(format!("malformed {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_payload() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("type".into(), json!("sell"));
        map.insert("category".into(), json!("apartment"));
        map.insert("price".into(), json!("25000000"));
        map
    }

    #[test]
    fn minimal_payload_parses() {
        let parsed = parse_property(base_payload());
        assert!(parsed.as_ref().is_ok_and(|p| p.fields.price == 25_000_000));
        assert!(parsed.is_ok_and(|p| p.fields.deal_type == "sell"));
    }

    #[test]
    fn missing_price_is_unprocessable() {
        let mut payload = base_payload();
        payload.remove("price");
        assert!(matches!(
            parse_property(payload),
            Err(ApiError::Unprocessable(_))
        ));
    }

    #[test]
    fn malformed_geo_position_is_a_conflict_naming_the_field() {
        let mut payload = base_payload();
        payload.insert("geoPosition".into(), json!("{not json"));
        match parse_property(payload) {
            Err(ApiError::Conflict(msg)) => assert!(msg.contains("geoPosition")),
            other => assert!(other.is_err(), "expected a conflict"),
        }
    }

    #[test]
    fn malformed_apartment_complex_is_silently_dropped() {
        let mut payload = base_payload();
        payload.insert("apartmentComplex".into(), json!("{not json"));
        let parsed = parse_property(payload);
        assert!(parsed.is_ok_and(|p| p.fields.apartment_complex.is_none()));
    }

    #[test]
    fn geo_position_accepts_string_and_object_forms() {
        let mut payload = base_payload();
        payload.insert("geoPosition".into(), json!(r#"{"city":"Almaty"}"#));
        let from_string = parse_property(payload);
        assert!(from_string.is_ok_and(|p| {
            p.fields
                .geo_position
                .is_some_and(|g| g.0.city.as_deref() == Some("Almaty"))
        }));

        let mut payload = base_payload();
        payload.insert("geoPosition".into(), json!({"city": "Almaty"}));
        let from_object = parse_property(payload);
        assert!(from_object.is_ok_and(|p| p.fields.geo_position.is_some()));
    }

    #[test]
    fn unknown_keys_land_in_attrs() {
        let mut payload = base_payload();
        payload.insert("houseCondition".into(), json!("good"));
        payload.insert("balcony".into(), json!("true"));
        let parsed = parse_property(payload);
        assert!(parsed.is_ok_and(|p| {
            p.fields.attrs.0.get("houseCondition") == Some(&json!("good"))
                && p.fields.attrs.0.contains_key("balcony")
        }));
    }

    #[test]
    fn order_lifecycle_fields_are_extracted() {
        let mut payload = base_payload();
        payload.insert("status".into(), json!("inWork"));
        payload.insert("declineReason".into(), json!("duplicate"));
        let parsed = parse_property(payload);
        assert!(parsed.is_ok_and(|p| {
            p.status.as_deref() == Some("inWork")
                && p.decline_reason.as_deref() == Some("duplicate")
                && !p.fields.attrs.0.contains_key("status")
        }));
    }

    #[test]
    fn uncastable_numeric_is_unprocessable() {
        let mut payload = base_payload();
        payload.insert("roomCount".into(), json!("many"));
        assert!(matches!(
            parse_property(payload),
            Err(ApiError::Unprocessable(_))
        ));
    }

    #[test]
    fn unknown_deal_type_is_rejected() {
        let mut payload = base_payload();
        payload.insert("type".into(), json!("lease"));
        assert!(matches!(
            parse_property(payload),
            Err(ApiError::Unprocessable(_))
        ));
    }
}
