//! Sell order entity: property intake with a status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::listing::PropertyFields;

/// Sell order lifecycle.
///
/// `new → inWork → completed | declined`. The transition into
/// `Completed` materializes a listing exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SellOrderStatus {
    /// Freshly submitted by the public client.
    New,
    /// Picked up by an agent.
    InWork,
    /// Accepted; a listing has been materialized from this order.
    Completed,
    /// Rejected.
    Declined,
}

impl SellOrderStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InWork => "inWork",
            Self::Completed => "completed",
            Self::Declined => "declined",
        }
    }

    /// Parses the wire string, if recognized.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "inWork" => Some(Self::InWork),
            "completed" => Some(Self::Completed),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

/// An intake request to list a property.
///
/// Structurally mirrors a listing's property fields; `created_object_id`
/// is set exactly once, when the order transitions into `completed`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SellOrder {
    /// Order identifier.
    pub id: Uuid,
    /// Shared property fields.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: PropertyFields,
    /// Lifecycle status, stored as text.
    pub status: String,
    /// Reason recorded when the order was declined.
    pub decline_reason: Option<String>,
    /// Listing materialized from this order, once completed.
    pub created_object_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Whether an update request asks for the completion transition.
///
/// Only an explicit `completed` in the update payload can trigger the
/// listing materialization; the conditional UPDATE in the repository
/// then guarantees it fires at most once.
#[must_use]
pub fn requests_completion(new_status: Option<&str>) -> bool {
    new_status == Some(SellOrderStatus::Completed.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_is_requested_only_by_explicit_status() {
        assert!(requests_completion(Some("completed")));
        assert!(!requests_completion(Some("inWork")));
        assert!(!requests_completion(Some("declined")));
        assert!(!requests_completion(None));
    }

    #[test]
    fn status_round_trips_through_wire_strings() {
        for status in [
            SellOrderStatus::New,
            SellOrderStatus::InWork,
            SellOrderStatus::Completed,
            SellOrderStatus::Declined,
        ] {
            assert_eq!(SellOrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SellOrderStatus::parse("COMPLETED"), None);
    }
}
