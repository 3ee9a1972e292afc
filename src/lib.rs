//! # estate-api
//!
//! REST backend for a real-estate agency: listing catalog with a rich
//! filter engine, seller intake workflow, lead capture, staff
//! authentication and an S3-backed image pipeline.
//!
//! ## Architecture
//!
//! ```text
//! Clients (public site, admin panel)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── ListingService / SellOrderService / FeedbackService /
//!     │   AuthService (service/)
//!     │
//!     ├── MediaStore (media/)  — S3 + WebP pipeline
//!     ├── TelegramNotifier (notify/)
//!     │
//!     └── PostgreSQL repositories (persistence/)
//! ```
//!
//! The visibility model splits callers into two audiences: the public
//! site, which only ever sees publishable listings and never owner
//! contact data, and the trusted admin service, which sees everything.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod media;
pub mod notify;
pub mod persistence;
pub mod service;
