//! Runtime application configuration
//!
//! AppConfig is the single source of truth for what the running process uses.
//! It is read from `TRACETREE_*` environment variables once at startup and
//! shared read-only afterwards.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;
use tracetree_core::config::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_DATABASE_PATH};
use tracetree_core::{ReferencePolicy, StoreConfig};

pub const DEFAULT_APP_NAME: &str = "TraceTree API";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Which browser origins may call the API
///
/// Defaults to any origin; the API is read-only and sends no credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

/// Runtime application configuration. Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name reported by the health endpoint
    pub app_name: String,

    pub host: IpAddr,

    pub port: u16,

    /// Passed to the tree store at startup
    pub store: StoreConfig,

    /// Whether unresolved references are served (lenient) or refused (strict)
    pub reference_policy: ReferencePolicy,

    pub cors_origins: CorsOrigins,

    /// Default log level is `debug` instead of `info`; `RUST_LOG` still wins
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            store: StoreConfig::default(),
            reference_policy: ReferencePolicy::Lenient,
            cors_origins: CorsOrigins::Any,
            debug: false,
        }
    }
}

impl AppConfig {
    /// Build config from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup; missing keys use defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("TRACETREE_APP_NAME") {
            config.app_name = name;
        }

        if let Some(host) = lookup("TRACETREE_HOST") {
            config.host = host
                .parse()
                .map_err(|_| ConfigError::invalid("TRACETREE_HOST", &host, "not an IP address"))?;
        }

        if let Some(port) = lookup("TRACETREE_PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::invalid("TRACETREE_PORT", &port, "not a port number"))?;
        }

        let database_path = lookup("TRACETREE_DATABASE_PATH")
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
        if database_path.trim().is_empty() {
            return Err(ConfigError::invalid(
                "TRACETREE_DATABASE_PATH",
                &database_path,
                "cannot be empty",
            ));
        }

        let busy_timeout_ms = match lookup("TRACETREE_BUSY_TIMEOUT_MS") {
            Some(ms) => match ms.parse::<u32>() {
                Ok(0) => {
                    return Err(ConfigError::invalid(
                        "TRACETREE_BUSY_TIMEOUT_MS",
                        &ms,
                        "must be greater than 0",
                    ))
                }
                Ok(value) => value,
                Err(_) => {
                    return Err(ConfigError::invalid(
                        "TRACETREE_BUSY_TIMEOUT_MS",
                        &ms,
                        "not a number",
                    ))
                }
            },
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };

        config.store = StoreConfig {
            database_path: PathBuf::from(database_path),
            busy_timeout_ms,
        };

        if let Some(strict) = lookup("TRACETREE_STRICT_REFERENCES") {
            config.reference_policy = if parse_bool("TRACETREE_STRICT_REFERENCES", &strict)? {
                ReferencePolicy::Strict
            } else {
                ReferencePolicy::Lenient
            };
        }

        if let Some(origins) = lookup("TRACETREE_CORS_ORIGINS") {
            config.cors_origins = parse_origins(&origins);
        }

        if let Some(debug) = lookup("TRACETREE_DEBUG") {
            config.debug = parse_bool("TRACETREE_DEBUG", &debug)?;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected true or false")),
    }
}

fn parse_origins(value: &str) -> CorsOrigins {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        CorsOrigins::Any
    } else {
        CorsOrigins::List(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.app_name, "TraceTree API");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.store, StoreConfig::default());
        assert_eq!(config.reference_policy, ReferencePolicy::Lenient);
        assert_eq!(config.cors_origins, CorsOrigins::Any);
        assert_eq!(config.default_log_filter(), "info");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TRACETREE_APP_NAME", "TraceTree Staging"),
            ("TRACETREE_HOST", "0.0.0.0"),
            ("TRACETREE_PORT", "9000"),
            ("TRACETREE_DATABASE_PATH", "/var/lib/tracetree/trees.db"),
            ("TRACETREE_BUSY_TIMEOUT_MS", "250"),
            ("TRACETREE_STRICT_REFERENCES", "true"),
            ("TRACETREE_CORS_ORIGINS", "https://a.example, https://b.example"),
            ("TRACETREE_DEBUG", "1"),
        ])
        .unwrap();

        assert_eq!(config.app_name, "TraceTree Staging");
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(
            config.store.database_path,
            PathBuf::from("/var/lib/tracetree/trees.db")
        );
        assert_eq!(config.store.busy_timeout_ms, 250);
        assert_eq!(config.reference_policy, ReferencePolicy::Strict);
        assert_eq!(
            config.cors_origins,
            CorsOrigins::List(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
        assert_eq!(config.default_log_filter(), "debug");
    }

    #[test]
    fn test_wildcard_origin() {
        let config = config_from(&[("TRACETREE_CORS_ORIGINS", "http://localhost:5173,*")]).unwrap();
        assert_eq!(config.cors_origins, CorsOrigins::Any);
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("TRACETREE_PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "TRACETREE_PORT",
                value: "eighty".to_string(),
                reason: "not a port number".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_bool() {
        assert!(config_from(&[("TRACETREE_STRICT_REFERENCES", "maybe")]).is_err());
    }

    #[test]
    fn test_zero_busy_timeout_names_its_own_variable() {
        let err = config_from(&[("TRACETREE_BUSY_TIMEOUT_MS", "0")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "TRACETREE_BUSY_TIMEOUT_MS",
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            }
        );
    }

    #[test]
    fn test_non_numeric_busy_timeout() {
        let err = config_from(&[("TRACETREE_BUSY_TIMEOUT_MS", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "TRACETREE_BUSY_TIMEOUT_MS", .. }
        ));
    }

    #[test]
    fn test_empty_database_path() {
        let err = config_from(&[("TRACETREE_DATABASE_PATH", "")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "TRACETREE_DATABASE_PATH",
                value: String::new(),
                reason: "cannot be empty".to_string(),
            }
        );
    }

    #[test]
    fn test_explicit_origin_list_replaces_default() {
        let config = config_from(&[("TRACETREE_CORS_ORIGINS", "http://localhost:5173")]).unwrap();
        assert_eq!(
            config.cors_origins,
            CorsOrigins::List(vec!["http://localhost:5173".to_string()])
        );
    }
}
