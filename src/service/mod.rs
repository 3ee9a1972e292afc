//! Service layer: orchestration between handlers, persistence, storage
//! and notifications.

pub mod auth;
pub mod feedbacks;
pub mod listings;
pub mod property;
pub mod sell_orders;

pub use auth::{AuthService, RegisterInput, UpdateUserInput};
pub use feedbacks::{FeedbackService, FeedbackUpdate};
pub use listings::ListingService;
pub use property::UploadFile;
pub use sell_orders::SellOrderService;
