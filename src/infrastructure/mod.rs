//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis, in-memory and no-op implementations)
//! - [`database`] - Supervised PostgreSQL connection with health loop
//! - [`persistence`] - Book repository implementations

pub mod cache;
pub mod database;
pub mod persistence;
