//! Domain layer: entities, enumerations, and the listing query engine.

pub mod feedback;
pub mod filter;
pub mod listing;
pub mod order;
pub mod role;
pub mod user;

pub use feedback::{Feedback, FeedbackStatus};
pub use filter::{ListingQuery, TotalFloorClause, VisibilityClause};
pub use listing::{
    Category, DealType, GeoPosition, ImagePair, Listing, OwnerInfo, PropertyFields,
    VisibilityStatus,
};
pub use order::{SellOrder, SellOrderStatus};
pub use role::Role;
pub use user::{Session, User};

/// Which of the two consuming clients issued the request.
///
/// Selected by the `x-service-id` header; gates query defaults and
/// field visibility, not route existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// The public site: filtered views, redacted fields.
    Public,
    /// The privileged administrative client: full data.
    AdminService,
}

impl Audience {
    /// Returns `true` for the administrative client.
    #[must_use]
    pub const fn is_admin_service(self) -> bool {
        matches!(self, Self::AdminService)
    }
}
