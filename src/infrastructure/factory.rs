//! Repository factory for runtime backend selection.
//!
//! This module provides a factory for creating the task repository based on
//! environment configuration. It supports switching between the in-memory
//! and `MongoDB` backends at startup.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `mongo`
//! - `MONGO_URI`: `MongoDB` connection URI (required when `STORAGE_MODE=mongo`)
//! - `MONGO_DATABASE`: database name (default: `gotask`)
//! - `MONGO_COLLECTION`: collection name (default: `tasks`)
//!
//! # Example
//!
//! ```ignore
//! use task_service::infrastructure::factory::{RepositoryConfig, RepositoryFactory};
//!
//! let config = RepositoryConfig::from_env()?;
//! let repository = RepositoryFactory::new(config).create().await?;
//! let tasks = repository.list_all().await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::{InMemoryTaskRepository, MongoTaskRepository, TaskRepository};

/// Default `MongoDB` database name.
pub const DEFAULT_DATABASE_NAME: &str = "gotask";

/// Default `MongoDB` collection name.
pub const DEFAULT_COLLECTION_NAME: &str = "tasks";

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage backend for tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// In-memory storage. Contents are lost on restart.
    #[default]
    InMemory,
    /// `MongoDB` document storage.
    Mongo,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Which backend to build.
    pub storage_mode: StorageMode,
    /// `MongoDB` connection URI (required when `storage_mode` is `Mongo`).
    pub mongo_uri: Option<String>,
    /// `MongoDB` database name.
    pub database_name: String,
    /// `MongoDB` collection name.
    pub collection_name: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            mongo_uri: None,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
        }
    }
}

impl RepositoryConfig {
    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` contains an invalid value
    /// - `MONGO_URI` is missing when `STORAGE_MODE=mongo`
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let storage_mode = match env::var("STORAGE_MODE") {
            Ok(value) => value.parse()?,
            Err(env::VarError::NotPresent) => StorageMode::default(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigurationError::InvalidStorageMode(
                    "<non-UTF-8 value>".to_string(),
                ));
            }
        };

        let config = Self {
            storage_mode,
            mongo_uri: non_empty_var("MONGO_URI"),
            database_name: non_empty_var("MONGO_DATABASE")
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            collection_name: non_empty_var("MONGO_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION_NAME.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingMongoUri` if `MongoDB` is selected
    /// without a URI.
    pub const fn validate(&self) -> Result<(), ConfigurationError> {
        if matches!(self.storage_mode, StorageMode::Mongo) && self.mongo_uri.is_none() {
            return Err(ConfigurationError::MissingMongoUri);
        }
        Ok(())
    }
}

/// Reads an environment variable, treating empty or whitespace-only values as unset.
pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'mongo'")]
    InvalidStorageMode(String),

    /// Missing `MONGO_URI` when storage mode is Mongo.
    #[error("MONGO_URI environment variable is required when STORAGE_MODE=mongo")]
    MissingMongoUri,

    /// A variable holds a value that does not parse.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Factory for creating the task repository based on configuration.
///
/// Creation is fail-fast: when `MongoDB` is selected the factory connects and
/// pings the server, and any failure is returned instead of producing a
/// repository that errors on every call.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Creates a new repository factory from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError::Configuration` if environment configuration is invalid.
    pub fn from_env() -> Result<Self, FactoryError> {
        let config = RepositoryConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Returns the configuration used by this factory.
    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Creates the repository selected by the configuration.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the configuration is invalid or the
    /// `MongoDB` server cannot be reached.
    pub async fn create(&self) -> Result<Arc<dyn TaskRepository>, FactoryError> {
        self.config.validate()?;

        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Arc::new(InMemoryTaskRepository::new())),
            StorageMode::Mongo => {
                let uri = self
                    .config
                    .mongo_uri
                    .as_deref()
                    .ok_or(ConfigurationError::MissingMongoUri)?;

                let repository = MongoTaskRepository::connect(
                    uri,
                    &self.config.database_name,
                    &self.config.collection_name,
                )
                .await
                .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

                Ok(Arc::new(repository))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // -------------------------------------------------------------------------
    // StorageMode Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("in_memory", StorageMode::InMemory)]
    #[case("inmemory", StorageMode::InMemory)]
    #[case("memory", StorageMode::InMemory)]
    #[case("IN_MEMORY", StorageMode::InMemory)]
    #[case("mongo", StorageMode::Mongo)]
    #[case("mongodb", StorageMode::Mongo)]
    #[case(" MongoDB ", StorageMode::Mongo)]
    fn test_storage_mode_from_str_valid(#[case] input: &str, #[case] expected: StorageMode) {
        let result: Result<StorageMode, _> = input.parse();
        assert_eq!(result, Ok(expected));
    }

    #[rstest]
    #[case("invalid")]
    #[case("postgres")]
    #[case("")]
    fn test_storage_mode_from_str_invalid(#[case] input: &str) {
        let result: Result<StorageMode, _> = input.parse();
        assert_eq!(
            result,
            Err(ConfigurationError::InvalidStorageMode(input.to_string()))
        );
    }

    #[rstest]
    fn test_storage_mode_default() {
        assert_eq!(StorageMode::default(), StorageMode::InMemory);
    }

    // -------------------------------------------------------------------------
    // RepositoryConfig Tests
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_repository_config_default() {
        let config = RepositoryConfig::default();
        assert_eq!(config.storage_mode, StorageMode::InMemory);
        assert!(config.mongo_uri.is_none());
        assert_eq!(config.database_name, "gotask");
        assert_eq!(config.collection_name, "tasks");
    }

    #[rstest]
    fn test_repository_config_validate_mongo_without_uri() {
        let config = RepositoryConfig {
            storage_mode: StorageMode::Mongo,
            ..RepositoryConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigurationError::MissingMongoUri));
    }

    #[rstest]
    fn test_repository_config_validate_mongo_with_uri() {
        let config = RepositoryConfig {
            storage_mode: StorageMode::Mongo,
            mongo_uri: Some("mongodb://localhost:27017".to_string()),
            ..RepositoryConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    // -------------------------------------------------------------------------
    // RepositoryFactory Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_factory_creates_in_memory_repository() {
        let factory = RepositoryFactory::new(RepositoryConfig::default());

        let repository = factory.create().await.unwrap();

        assert!(repository.list_all().await.unwrap().is_empty());
        assert!(repository.ping().await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn test_factory_rejects_mongo_without_uri() {
        let factory = RepositoryFactory::new(RepositoryConfig {
            storage_mode: StorageMode::Mongo,
            ..RepositoryConfig::default()
        });

        let result = factory.create().await;

        assert!(matches!(
            result,
            Err(FactoryError::Configuration(
                ConfigurationError::MissingMongoUri
            ))
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn test_factory_fails_fast_on_malformed_uri() {
        let factory = RepositoryFactory::new(RepositoryConfig {
            storage_mode: StorageMode::Mongo,
            mongo_uri: Some("not-a-mongodb-uri".to_string()),
            ..RepositoryConfig::default()
        });

        let result = factory.create().await;

        assert!(matches!(result, Err(FactoryError::DatabaseConnection(_))));
    }
}
