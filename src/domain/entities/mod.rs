//! Core domain entities.
//!
//! Entities are plain data structures. Creation and mutation inputs live next
//! to the entity they target:
//! - [`NewBook`] - fields supplied by a create request
//! - [`BookUpdate`] - partial update with the usecase-assigned `updated_at`

pub mod book;

pub use book::{Book, BookChanges, BookUpdate, NewBook};
