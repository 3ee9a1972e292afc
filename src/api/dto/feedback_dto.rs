//! Feedback DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// A new lead submitted from the public site.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCreateRequest {
    /// Lead's name.
    pub name: String,
    /// Lead's phone number.
    pub phone: String,
    /// Listing the lead is about, when submitted from a listing page.
    pub estate_id: Option<Uuid>,
    /// Free-form message.
    pub description: Option<String>,
}

/// Admin-side lead changes; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackUpdateRequest {
    /// Lead's name.
    pub name: Option<String>,
    /// Lead's phone number.
    pub phone: Option<String>,
    /// Lifecycle status (`new`/`inWork`/`completed`).
    pub status: Option<String>,
    /// Re-target to another listing.
    pub estate_id: Option<Uuid>,
    /// Free-form message.
    pub description: Option<String>,
}

/// Filters for the lead collection.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackListQuery {
    /// Lifecycle status; open leads (`new` and `inWork`) when absent.
    pub status: Option<String>,
    /// Narrow to leads on one listing.
    pub estate_id: Option<Uuid>,
}
