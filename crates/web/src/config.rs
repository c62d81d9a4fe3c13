//! Web application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TAXI_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; only required when `TAXI_STORE=postgres`)
//!
//! ## Optional
//! - `TAXI_STORE` - `postgres` or `memory` (default: postgres)
//! - `TAXI_HOST` - Bind address (default: 127.0.0.1)
//! - `TAXI_PORT` - Listen port (default: 8000)
//! - `TAXI_BASE_URL` - Public URL (default: <http://localhost:8000>)
//! - `TAXI_PAGE_SIZE` - Records per list page (default: 5)
//! - `TAXI_DRIVER_SEARCH` - `contains` or `exact` (default: contains)
//! - `TAXI_DEMO_PASSWORD` - With `TAXI_STORE=memory`, seed demo data and give
//!   every demo driver this password
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;

use secrecy::SecretString;
use thiserror::Error;

use taxi_core::{PageRequest, SearchMode};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where entities are persisted.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// `PostgreSQL` via sqlx (connection URL contains password).
    Postgres { database_url: SecretString },
    /// In-process store; contents are lost on restart.
    Memory,
}

/// List view behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingConfig {
    /// Records per page
    pub page_size: NonZeroU32,
    /// How `?username=` matches drivers
    pub driver_search: SearchMode,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: PageRequest::DEFAULT_SIZE,
            driver_search: SearchMode::default(),
        }
    }
}

/// Web application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Persistence backend
    pub store: StoreBackend,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// List view settings
    pub listing: ListingConfig,
    /// Password for seeded demo drivers (memory store only)
    pub demo_password: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 - 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate (0.0 - 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let store = match env.or_default("TAXI_STORE", "postgres").trim() {
            "postgres" => StoreBackend::Postgres {
                database_url: env.database_url("TAXI_DATABASE_URL")?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "TAXI_STORE".to_string(),
                    format!("expected \"postgres\" or \"memory\", got {other:?}"),
                ));
            }
        };
        let host = env
            .or_default("TAXI_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("TAXI_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("TAXI_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("TAXI_PORT".to_string(), e.to_string()))?;
        let base_url = env.or_default("TAXI_BASE_URL", "http://localhost:8000");

        let page_size = match env.optional("TAXI_PAGE_SIZE") {
            Some(value) => value.trim().parse::<NonZeroU32>().map_err(|e| {
                ConfigError::InvalidEnvVar("TAXI_PAGE_SIZE".to_string(), e.to_string())
            })?,
            None => PageRequest::DEFAULT_SIZE,
        };
        let driver_search = match env.optional("TAXI_DRIVER_SEARCH") {
            Some(value) => value.parse::<SearchMode>().map_err(|e| {
                ConfigError::InvalidEnvVar("TAXI_DRIVER_SEARCH".to_string(), e.to_string())
            })?,
            None => SearchMode::default(),
        };

        let demo_password = env.optional("TAXI_DEMO_PASSWORD").map(SecretString::from);

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            store,
            host,
            port,
            base_url,
            listing: ListingConfig {
                page_size,
                driver_search,
            },
            demo_password,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<WebConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        WebConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_memory_store() {
        let config = load(&[("TAXI_STORE", "memory")]).unwrap();
        assert!(matches!(config.store, StoreBackend::Memory));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.listing, ListingConfig::default());
        assert_eq!(config.listing.page_size.get(), 5);
        assert_eq!(config.listing.driver_search, SearchMode::Contains);
        assert!(config.demo_password.is_none());
        assert!(config.sentry_dsn.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "TAXI_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback/taxi")]).unwrap();
        match config.store {
            StoreBackend::Postgres { database_url } => {
                assert_eq!(database_url.expose_secret(), "postgres://fallback/taxi");
            }
            StoreBackend::Memory => panic!("expected postgres"),
        }

        let config = load(&[
            ("DATABASE_URL", "postgres://fallback/taxi"),
            ("TAXI_DATABASE_URL", "postgres://primary/taxi"),
        ])
        .unwrap();
        match config.store {
            StoreBackend::Postgres { database_url } => {
                assert_eq!(database_url.expose_secret(), "postgres://primary/taxi");
            }
            StoreBackend::Memory => panic!("expected postgres"),
        }
    }

    #[test]
    fn test_listing_overrides() {
        let config = load(&[
            ("TAXI_STORE", "memory"),
            ("TAXI_PAGE_SIZE", "2"),
            ("TAXI_DRIVER_SEARCH", "exact"),
        ])
        .unwrap();
        assert_eq!(config.listing.page_size.get(), 2);
        assert_eq!(config.listing.driver_search, SearchMode::Exact);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("TAXI_PAGE_SIZE", "0"),
            ("TAXI_PAGE_SIZE", "many"),
            ("TAXI_DRIVER_SEARCH", "fuzzy"),
            ("TAXI_PORT", "99999"),
            ("TAXI_HOST", "localhost"),
            ("TAXI_STORE", "redis"),
        ] {
            let err = load(&[("TAXI_STORE", "memory"), (key, value)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == key),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_https_base_url_is_secure() {
        let config = load(&[
            ("TAXI_STORE", "memory"),
            ("TAXI_BASE_URL", "https://taxi.example.com"),
        ])
        .unwrap();
        assert!(config.is_secure());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("TAXI_DATABASE_URL", "postgres://user:hunter2@db/taxi")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_demo_password_is_redacted() {
        let config = load(&[("TAXI_STORE", "memory"), ("TAXI_DEMO_PASSWORD", "letmein123")]).unwrap();
        assert_eq!(
            config.demo_password.as_ref().unwrap().expose_secret(),
            "letmein123"
        );
        assert!(!format!("{config:?}").contains("letmein123"));
    }
}
