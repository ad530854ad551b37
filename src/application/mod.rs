//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! id and timestamp assignment, and request deadlines. Services consume
//! repository traits and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::book_service::BookService`] - Book create, read, list, update, delete

pub mod services;
