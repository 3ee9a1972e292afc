//! Listing query engine: translates an untrusted query-parameter bag
//! into a validated, role-aware filter.
//!
//! The engine is deliberately permissive: only a fixed allow-list of
//! pass-through equality filters is honored and everything else is
//! silently ignored. Bad values for derived clauses drop that clause;
//! a list query never fails on input. This is a documented policy
//! choice, not a validation gap.

use std::collections::HashMap;

use super::Audience;
use super::listing::VisibilityStatus;

/// Allow-list of pass-through equality filters: parameter name to the
/// SQL lvalue it compares against. Unknown keys are a no-op by design.
const PASS_THROUGH: &[(&str, &str)] = &[
    ("type", "deal_type"),
    ("category", "category"),
    ("businessType", "business_type"),
    ("estateAgent", "estate_agent::text"),
    ("geoPosition", "geo_position::text"),
    ("images", "images::text"),
    ("description", "description"),
    ("discount", "attrs ->> 'discount'"),
    ("soldPrice", "attrs ->> 'soldPrice'"),
    ("sourceCustomer", "attrs ->> 'sourceCustomer'"),
    ("dealOwner", "attrs ->> 'dealOwner'"),
    ("mortgage", "attrs ->> 'mortgage'"),
    ("exchange", "attrs ->> 'exchange'"),
    ("videoLink", "attrs ->> 'videoLink'"),
    ("tiktokLink", "attrs ->> 'tiktokLink'"),
    ("isCommercial", "attrs ->> 'isCommercial'"),
    ("pledge", "attrs ->> 'pledge'"),
    ("documents", "documents"),
    ("apartmentComplex", "apartment_complex::text"),
    ("ownerInfo", "owner_info::text"),
    ("countFloor", "attrs ->> 'countFloor'"),
    ("ceilingHeight", "attrs ->> 'ceilingHeight'"),
    ("toiletCount", "attrs ->> 'toiletCount'"),
    ("houseCondition", "attrs ->> 'houseCondition'"),
    ("houseWallMaterial", "attrs ->> 'houseWallMaterial'"),
    ("houseRoofMaterial", "attrs ->> 'houseRoofMaterial'"),
    ("furniture", "attrs ->> 'furniture'"),
    ("ethernet", "attrs ->> 'ethernet'"),
    ("parkingSeat", "attrs ->> 'parkingSeat'"),
    ("plotSquare", "attrs ->> 'plotSquare'"),
    ("hasBasement", "attrs ->> 'hasBasement'"),
    ("hasMansard", "attrs ->> 'hasMansard'"),
    ("houseType", "attrs ->> 'houseType'"),
    ("electricType", "attrs ->> 'electricType'"),
    ("heatingType", "attrs ->> 'heatingType'"),
    ("gasType", "attrs ->> 'gasType'"),
    ("sewerType", "attrs ->> 'sewerType'"),
    ("toiletType", "attrs ->> 'toiletType'"),
    ("waterType", "attrs ->> 'waterType'"),
    ("garage", "attrs ->> 'garage'"),
    ("landSquare", "attrs ->> 'landSquare'"),
];

/// Default page size when `limit` is absent or unparsable.
pub const DEFAULT_LIMIT: i64 = 200;

/// Rooms are bucketed at seven or more.
pub const ROOM_BUCKET_THRESHOLD: i32 = 7;

/// Floor counts above nine form a bucket instead of exact matches.
pub const FLOOR_BUCKET_THRESHOLD: i32 = 9;

/// Visibility clause resolved from the caller's audience and the
/// requested status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityClause {
    /// Match any of the given statuses.
    AnyOf(Vec<String>),
    /// Match exactly one status.
    Exactly(String),
}

/// Total-floor clause: exact below the bucket threshold, strictly
/// greater above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalFloorClause {
    /// `total_floor = n`.
    Exact(i32),
    /// `total_floor > n`.
    Above(i32),
}

/// A validated, role-aware listing filter.
#[derive(Debug, Clone)]
pub struct ListingQuery {
    /// Visibility restriction, always present.
    pub visibility: VisibilityClause,
    /// `(sql lvalue, value)` pairs from the pass-through table.
    pub pass_through: Vec<(&'static str, String)>,
    /// Inclusive lower price bound.
    pub price_min: Option<i64>,
    /// Inclusive upper price bound.
    pub price_max: Option<i64>,
    /// Requested room counts (set membership).
    pub room_counts: Vec<i32>,
    /// Widen the room match to "seven or more".
    pub rooms_seven_plus: bool,
    /// Only listings not on the first floor.
    pub not_first_floor: bool,
    /// Only listings not on the last floor.
    pub not_last_floor: bool,
    /// Exact unit floor.
    pub target_floor: Option<i32>,
    /// Total-floor clause.
    pub total_floor: Option<TotalFloorClause>,
    /// Inclusive lower bound on living area.
    pub house_square_min: Option<f64>,
    /// Inclusive upper bound on living area.
    pub house_square_max: Option<f64>,
    /// Lower bound on kitchen area.
    pub kitchen_square_min: Option<f64>,
    /// Lower bound on construction year.
    pub building_year_min: Option<i32>,
    /// Exact city match on the geo field.
    pub city: Option<String>,
    /// Exact district match on the geo field.
    pub city_region: Option<String>,
    /// Case-insensitive substring match on the street name.
    pub street_search: Option<String>,
    /// 1-indexed page.
    pub page: i64,
    /// Page size.
    pub limit: i64,
}

impl ListingQuery {
    /// Builds a filter from an untrusted parameter bag.
    ///
    /// Never fails: unknown keys and unparsable values are ignored.
    #[must_use]
    pub fn from_params(params: &HashMap<String, String>, audience: Audience) -> Self {
        let get = |key: &str| params.get(key).map(String::as_str);
        let non_empty = |key: &str| get(key).filter(|v| !v.is_empty()).map(str::to_string);

        let visibility = resolve_visibility(get("visibilityStatus"), audience);

        let pass_through = PASS_THROUGH
            .iter()
            .filter_map(|&(param, lvalue)| params.get(param).map(|v| (lvalue, v.clone())))
            .collect();

        let room_counts: Vec<i32> = get("roomCount")
            .map(|raw| raw.split(',').filter_map(|p| p.trim().parse().ok()).collect())
            .unwrap_or_default();
        let rooms_seven_plus = room_counts.iter().any(|&c| c >= ROOM_BUCKET_THRESHOLD);

        let total_floor = get("totalFloor").and_then(|v| v.parse().ok()).map(|n| {
            if n > FLOOR_BUCKET_THRESHOLD {
                TotalFloorClause::Above(n)
            } else {
                TotalFloorClause::Exact(n)
            }
        });

        let page: i64 = get("page").and_then(|v| v.parse().ok()).unwrap_or(1).max(1);
        let limit: i64 = get("limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LIMIT)
            .max(1);

        Self {
            visibility,
            pass_through,
            price_min: get("priceStart").and_then(|v| v.parse().ok()),
            price_max: get("priceEnd").and_then(|v| v.parse().ok()),
            room_counts,
            rooms_seven_plus,
            not_first_floor: get("notFirstFloor") == Some("true"),
            not_last_floor: get("notLastFloor") == Some("true"),
            target_floor: get("targetFloor").and_then(|v| v.parse().ok()),
            total_floor,
            house_square_min: get("houseSquare").and_then(|v| v.parse().ok()),
            house_square_max: get("houseSquareEnd").and_then(|v| v.parse().ok()),
            kitchen_square_min: get("kitchenSquare").and_then(|v| v.parse().ok()),
            building_year_min: get("houseBuildingYear").and_then(|v| v.parse().ok()),
            city: non_empty("city"),
            city_region: non_empty("cityRegion"),
            street_search: non_empty("searchStreet"),
            page,
            limit,
        }
    }

    /// Row offset implied by the page and limit.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Resolves the visibility clause for a caller.
///
/// Admin service: an explicit status is used verbatim; otherwise the
/// default is {active, checking}. Public client: `checking`, `canceled`
/// and absent all coerce to `active`; any other explicit value passes
/// through unchanged.
fn resolve_visibility(requested: Option<&str>, audience: Audience) -> VisibilityClause {
    let requested = requested.filter(|v| !v.is_empty());
    match audience {
        Audience::AdminService => match requested {
            Some(status) => VisibilityClause::Exactly(status.to_string()),
            None => VisibilityClause::AnyOf(vec![
                VisibilityStatus::Active.as_str().to_string(),
                VisibilityStatus::Checking.as_str().to_string(),
            ]),
        },
        Audience::Public => match requested {
            None | Some("checking") | Some("canceled") => {
                VisibilityClause::Exactly(VisibilityStatus::Active.as_str().to_string())
            }
            Some(status) => VisibilityClause::Exactly(status.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Keys consumed by derived clauses and pagination. They must stay
    /// out of the pass-through table or a single parameter would bind
    /// twice.
    const RESERVED: &[&str] = &[
        "priceStart",
        "priceEnd",
        "houseSquare",
        "houseSquareEnd",
        "kitchenSquare",
        "houseBuildingYear",
        "city",
        "cityRegion",
        "targetFloor",
        "totalFloor",
        "notFirstFloor",
        "notLastFloor",
        "roomCount",
        "visibilityStatus",
        "page",
        "limit",
        "searchStreet",
    ];

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reserved_keys_are_disjoint_from_the_pass_through_table() {
        for key in RESERVED {
            assert!(
                PASS_THROUGH.iter().all(|&(param, _)| param != *key),
                "{key} is both reserved and pass-through"
            );
        }
    }

    #[test]
    fn unknown_keys_are_silently_ignored() {
        let bag = params(&[("category", "house"), ("dropTables", "1"), ("?!", "x")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert_eq!(query.pass_through, vec![("category", "house".to_string())]);
    }

    #[test]
    fn pass_through_attrs_keys_target_the_json_map() {
        let bag = params(&[("houseCondition", "good"), ("garage", "attached")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert!(
            query
                .pass_through
                .contains(&("attrs ->> 'houseCondition'", "good".to_string()))
        );
        assert!(
            query
                .pass_through
                .contains(&("attrs ->> 'garage'", "attached".to_string()))
        );
    }

    #[test]
    fn price_bounds_are_inclusive_range_parts() {
        let bag = params(&[("priceStart", "1000"), ("priceEnd", "5000")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert_eq!(query.price_min, Some(1000));
        assert_eq!(query.price_max, Some(5000));
    }

    #[test]
    fn room_count_below_bucket_is_plain_membership() {
        let bag = params(&[("roomCount", "2,3")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert_eq!(query.room_counts, vec![2, 3]);
        assert!(!query.rooms_seven_plus);
    }

    #[test]
    fn room_count_at_or_above_seven_widens_to_bucket() {
        let bag = params(&[("roomCount", "3,8")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert_eq!(query.room_counts, vec![3, 8]);
        assert!(query.rooms_seven_plus);
    }

    #[test]
    fn garbage_room_counts_drop_silently() {
        let bag = params(&[("roomCount", "two,,x")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert!(query.room_counts.is_empty());
        assert!(!query.rooms_seven_plus);
    }

    #[test]
    fn total_floor_buckets_above_nine() {
        let bag = params(&[("totalFloor", "9")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert_eq!(query.total_floor, Some(TotalFloorClause::Exact(9)));

        let bag = params(&[("totalFloor", "10")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert_eq!(query.total_floor, Some(TotalFloorClause::Above(10)));
    }

    #[test]
    fn floor_exclusions_require_the_literal_true() {
        let bag = params(&[("notFirstFloor", "true"), ("notLastFloor", "1")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert!(query.not_first_floor);
        assert!(!query.not_last_floor);
    }

    #[test]
    fn admin_defaults_to_active_and_checking() {
        let query = ListingQuery::from_params(&params(&[]), Audience::AdminService);
        assert_eq!(
            query.visibility,
            VisibilityClause::AnyOf(vec!["active".into(), "checking".into()])
        );
    }

    #[test]
    fn admin_explicit_status_is_verbatim() {
        let bag = params(&[("visibilityStatus", "canceled")]);
        let query = ListingQuery::from_params(&bag, Audience::AdminService);
        assert_eq!(query.visibility, VisibilityClause::Exactly("canceled".into()));
    }

    #[test]
    fn public_coerces_hidden_statuses_to_active() {
        for requested in [&[][..], &[("visibilityStatus", "checking")], &[("visibilityStatus", "canceled")]] {
            let query = ListingQuery::from_params(&params(requested), Audience::Public);
            assert_eq!(query.visibility, VisibilityClause::Exactly("active".into()));
        }
    }

    #[test]
    fn public_passes_other_statuses_through() {
        let bag = params(&[("visibilityStatus", "sold")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert_eq!(query.visibility, VisibilityClause::Exactly("sold".into()));
    }

    #[test]
    fn pagination_defaults_and_offset() {
        let query = ListingQuery::from_params(&params(&[]), Audience::Public);
        assert_eq!((query.page, query.limit), (1, 200));
        assert_eq!(query.offset(), 0);

        let bag = params(&[("page", "3"), ("limit", "50")]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert_eq!(query.offset(), 100);
    }

    #[test]
    fn mixed_recognized_and_unrecognized_params_never_error() {
        let bag = params(&[
            ("priceStart", "not-a-number"),
            ("city", "Almaty"),
            ("totallyUnknown", "whatever"),
        ]);
        let query = ListingQuery::from_params(&bag, Audience::Public);
        assert_eq!(query.price_min, None);
        assert_eq!(query.city.as_deref(), Some("Almaty"));
    }
}
