//! Store configuration
//!
//! Built once at process startup and handed to [`DatabaseService::new`](crate::db::DatabaseService::new).
//! Nothing reads configuration from globals after that point.

use std::path::PathBuf;

/// Default busy timeout for every connection (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// Default database location, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "data/tracetree.db";

/// Configuration for the libsql tree store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path to the database file (parent directories are created on open)
    pub database_path: PathBuf,

    /// How long a connection waits on a locked database before failing
    pub busy_timeout_ms: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Config for a database at `database_path` with default settings
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.database_path.as_os_str().is_empty() {
            return Err("database_path cannot be empty".to_string());
        }

        if self.busy_timeout_ms == 0 {
            return Err("busy_timeout_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = StoreConfig::default();
        assert_eq!(config.database_path, PathBuf::from("data/tracetree.db"));
        assert_eq!(config.busy_timeout_ms, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_path() {
        let config = StoreConfig::new("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = StoreConfig {
            busy_timeout_ms: 0,
            ..StoreConfig::new("/tmp/trees.db")
        };
        assert_eq!(
            config.validate().unwrap_err(),
            "busy_timeout_ms must be greater than 0"
        );
    }
}
