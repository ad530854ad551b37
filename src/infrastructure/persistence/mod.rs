//! Book repository implementations.
//!
//! # Repositories
//!
//! - [`PgBookRepository`] - PostgreSQL storage over the supervised pool
//! - [`CachedBookRepository`] - cache-aside decorator with write-path invalidation
//! - [`InMemoryBookRepository`] - in-process store for tests and local runs

pub mod cached_book_repository;
pub mod memory_book_repository;
pub mod pg_book_repository;

pub use cached_book_repository::CachedBookRepository;
pub use memory_book_repository::InMemoryBookRepository;
pub use pg_book_repository::PgBookRepository;
