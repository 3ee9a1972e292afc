//! Feedback entity: an inbound buyer lead referencing a listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Feedback lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackStatus {
    /// Freshly submitted.
    New,
    /// Picked up by an agent.
    InWork,
    /// Closed.
    Completed,
}

impl FeedbackStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InWork => "inWork",
            Self::Completed => "completed",
        }
    }
}

/// A buyer lead referencing a target listing.
///
/// `title` is a denormalized human-readable description re-derived
/// from the referenced listing on every create and update call; it
/// does not track listing edits between calls.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Feedback identifier.
    pub id: Uuid,
    /// Lead's name.
    pub name: String,
    /// Lead's phone number.
    pub phone: String,
    /// Lifecycle status, stored as text.
    pub status: String,
    /// Referenced listing.
    pub estate_id: Option<Uuid>,
    /// Free-form message from the lead.
    pub description: Option<String>,
    /// Agent denormalized from the referenced listing at creation time.
    pub estate_agent: Option<Uuid>,
    /// Frozen human-readable listing description.
    pub title: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
