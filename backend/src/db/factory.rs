//! Repository factory for dependency injection.
//!
//! Builds the process-wide repository from runtime configuration. The store
//! handle is opened once here and shared by every request afterwards.

use std::str::FromStr;
use std::sync::Arc;

#[cfg(feature = "local-repo")]
use super::repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
use super::repositories::SqliteRepository;
use super::repo_config::ServiceConfig;
use super::repository::{PersonRepository, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// rusqlite-backed store
    Sqlite,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("sqlite", "sqlite3", "local", "memory").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```no_run
/// use person_service::db::{RepositoryFactory, ServiceConfig};
///
/// let config = ServiceConfig::load().unwrap();
/// let repo = RepositoryFactory::from_config(&config).unwrap();
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance from the loaded service configuration.
    pub fn from_config(config: &ServiceConfig) -> RepositoryResult<Arc<dyn PersonRepository>> {
        match config.repository_type()? {
            RepositoryType::Sqlite => {
                #[cfg(feature = "sqlite-repo")]
                {
                    let repo = Self::create_sqlite(&config.sqlite.path)?;
                    Ok(repo as Arc<dyn PersonRepository>)
                }
                #[cfg(not(feature = "sqlite-repo"))]
                {
                    Err(super::repository::RepositoryError::configuration(
                        "SQLite repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => {
                #[cfg(feature = "local-repo")]
                {
                    Ok(Self::create_local())
                }
                #[cfg(not(feature = "local-repo"))]
                {
                    Err(super::repository::RepositoryError::configuration(
                        "Local repository feature not enabled",
                    ))
                }
            }
        }
    }

    /// Open a SQLite repository. `:memory:` selects a private in-memory store.
    #[cfg(feature = "sqlite-repo")]
    pub fn create_sqlite(path: &str) -> RepositoryResult<Arc<SqliteRepository>> {
        let repo = if path == ":memory:" {
            SqliteRepository::open_in_memory()?
        } else {
            SqliteRepository::open(path)?
        };
        Ok(Arc::new(repo))
    }

    /// Create an in-memory local repository.
    #[cfg(feature = "local-repo")]
    pub fn create_local() -> Arc<dyn PersonRepository> {
        Arc::new(LocalRepository::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_type_aliases() {
        assert_eq!("sqlite".parse(), Ok(RepositoryType::Sqlite));
        assert_eq!("SQLite3".parse(), Ok(RepositoryType::Sqlite));
        assert_eq!("memory".parse(), Ok(RepositoryType::Local));
        assert_eq!(" local ".parse(), Ok(RepositoryType::Local));
        assert!("postgres".parse::<RepositoryType>().is_err());
    }
}
