//! Shared helpers.
//!
//! - [`id_generator`] - snowflake-style book ids
//! - [`fake_books`] - generated data for the `admin seed` command

pub mod fake_books;
pub mod id_generator;
