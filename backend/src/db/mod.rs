//! Database module for person storage.
//!
//! Storage is reached only through the [`PersonRepository`] trait, so the
//! backend can be swapped without touching the logic or HTTP layers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers (http::handlers)                         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Logic layer (services::PersonService)                  │
//! │  - Per-call deadline                                    │
//! │  - Existence check before delete                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository trait (repository::PersonRepository)        │
//! └───────────┬───────────────────────────────┬─────────────┘
//!             │                               │
//!   ┌─────────▼──────────┐          ┌─────────▼──────────┐
//!   │  SqliteRepository  │          │  LocalRepository   │
//!   │  (rusqlite)        │          │  (in-memory)       │
//!   └────────────────────┘          └────────────────────┘
//! ```
//!
//! # Usage
//! ```no_run
//! use person_service::db::{RepositoryFactory, ServiceConfig};
//!
//! let config = ServiceConfig::load()?;
//! let repo = RepositoryFactory::from_config(&config)?;
//! # Ok::<(), person_service::db::RepositoryError>(())
//! ```

#[cfg(not(any(feature = "sqlite-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::ServiceConfig;
#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use repositories::SqliteRepository;
pub use repository::{ErrorContext, PersonRepository, RepositoryError, RepositoryResult};
