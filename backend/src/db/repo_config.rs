//! Service configuration file support.
//!
//! Configuration is read from a `person-service.toml` file when one exists,
//! falls back to built-in defaults otherwise, and is then overridden by
//! environment variables. It is fixed for the lifetime of the process.
//!
//! ```toml
//! [server]
//! host = "localhost"
//! port = 9080
//! request_timeout_secs = 20
//!
//! [repository]
//! type = "sqlite"
//!
//! [sqlite]
//! path = "Person.db"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::factory::RepositoryType;
use super::repository::RepositoryError;

pub const CONFIG_FILE_NAME: &str = "person-service.toml";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub sqlite: SqliteSettings,
}

/// HTTP listener and request settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deadline applied to every logic-layer operation.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Repository type settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
}

/// SQLite store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteSettings {
    /// Database file path, or `:memory:` for a private in-memory store.
    #[serde(default = "default_sqlite_path")]
    pub path: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9080
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_repo_type() -> String {
    "sqlite".to_string()
}

fn default_sqlite_path() -> String {
    "Person.db".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
        }
    }
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            path: default_sqlite_path(),
        }
    }
}

impl ServiceConfig {
    /// Load service configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(ServiceConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find the configuration file in the standard locations.
    ///
    /// Searches for `person-service.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn default_location() -> Option<PathBuf> {
        [
            PathBuf::from(CONFIG_FILE_NAME),
            Path::new("backend").join(CONFIG_FILE_NAME),
            Path::new("..").join(CONFIG_FILE_NAME),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Load the file from the default location (or defaults if none exists)
    /// and apply environment overrides.
    pub fn load() -> Result<Self, RepositoryError> {
        let config = match Self::default_location() {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Recognised keys: `HOST`, `PORT`, `DATABASE_PATH`, `REPOSITORY_TYPE`,
    /// `REQUEST_TIMEOUT_SECS`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, RepositoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|e| {
                RepositoryError::configuration(format!("Invalid PORT '{}': {}", port, e))
            })?;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.sqlite.path = path;
        }
        if let Some(repo_type) = lookup("REPOSITORY_TYPE") {
            self.repository.repo_type = repo_type;
        }
        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = secs.trim().parse().map_err(|e| {
                RepositoryError::configuration(format!(
                    "Invalid REQUEST_TIMEOUT_SECS '{}': {}",
                    secs, e
                ))
            })?;
        }
        // The repository type must parse.
        self.repository_type()?;
        Ok(self)
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, RepositoryError> {
        RepositoryType::from_str(&self.repository.repo_type).map_err(RepositoryError::configuration)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_address(), "localhost:9080");
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert_eq!(config.sqlite.path, "Person.db");
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Sqlite);
    }

    #[test]
    fn test_parse_local_config() {
        let toml = r#"
[server]
port = 8000

[repository]
type = "local"
"#;

        let config: ServiceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = [
            ("HOST", "0.0.0.0"),
            ("PORT", "9999"),
            ("DATABASE_PATH", ":memory:"),
            ("REQUEST_TIMEOUT_SECS", "3"),
        ]
        .into_iter()
        .collect();

        let config = ServiceConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9999");
        assert_eq!(config.sqlite.path, ":memory:");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let bad_port = ServiceConfig::default().with_overrides(|key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        });
        assert!(matches!(
            bad_port,
            Err(RepositoryError::ConfigurationError { .. })
        ));

        let bad_type = ServiceConfig::default().with_overrides(|key| {
            (key == "REPOSITORY_TYPE").then(|| "postgres".to_string())
        });
        assert!(bad_type.is_err());
    }
}
