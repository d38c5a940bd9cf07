//! Repository implementations module.
//!
//! This module contains the implementations of the `PersonRepository` trait:
//! - `sqlite`: SQLite implementation using rusqlite
//! - `local`: In-memory implementation for unit testing and local development
#[cfg(feature = "local-repo")]
pub mod local;
#[cfg(feature = "sqlite-repo")]
pub mod sqlite;

#[cfg(feature = "local-repo")]
pub use local::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use sqlite::SqliteRepository;
