//! Domain layer: entities, repository contracts, pagination rules.
//!
//! The domain layer has no knowledge of HTTP. Repository traits are
//! implemented by the infrastructure layer and consumed by
//! [`crate::application::services`].
//!
//! - [`entities`] - Book and its write inputs
//! - [`repositories`] - Data access traits and their error type
//! - [`pagination`] - Offset and page-count arithmetic

pub mod entities;
pub mod pagination;
pub mod repositories;
