//! Request and response DTOs organized by resource.

pub mod auth_dto;
pub mod common_dto;
pub mod feedback_dto;

pub use auth_dto::{AuthResponse, LoginRequest};
pub use common_dto::{ListResponse, StatusQuery};
pub use feedback_dto::{FeedbackCreateRequest, FeedbackListQuery, FeedbackUpdateRequest};
