//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Envelope for collection responses, echoing the applied page window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    /// Records in the requested window.
    pub data: Vec<T>,
    /// 1-indexed page that was served.
    pub page: i64,
    /// Window size that was applied.
    pub limit: i64,
}

/// Optional status filter for lifecycle-bearing collections.
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct StatusQuery {
    /// Lifecycle status to narrow to.
    pub status: Option<String>,
}
