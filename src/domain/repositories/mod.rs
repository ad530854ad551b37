//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.

pub mod book_repository;
pub mod error;

pub use book_repository::BookRepository;
pub use error::RepositoryError;

#[cfg(test)]
pub use book_repository::MockBookRepository;
