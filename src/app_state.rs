//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::persistence::FailedUploadRepo;
use crate::service::{AuthService, FeedbackService, ListingService, SellOrderService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Listing search and CRUD.
    pub listings: Arc<ListingService>,
    /// Sell order intake and workflow.
    pub orders: Arc<SellOrderService>,
    /// Lead capture and triage.
    pub feedbacks: Arc<FeedbackService>,
    /// Credentials, sessions and staff accounts.
    pub auth: Arc<AuthService>,
    /// Upload failure log, read directly by the system endpoint.
    pub failed_uploads: FailedUploadRepo,
    /// Token verification for the auth extractor.
    pub tokens: Arc<TokenIssuer>,
}
