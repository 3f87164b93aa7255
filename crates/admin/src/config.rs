//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin panel
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` URL for persistent sessions
//!   (falls back to `DATABASE_URL`; in-memory sessions when neither is set)
//! - `ADMIN_STATIC_DIR` - Stylesheets and scripts (default: crates/admin/static)
//! - `ADMIN_STOREFRONT_URL` - Link target for "View store" (default: `http://localhost:3000`)
//! - `BACKEND_URL` - REST backend (default: `https://nikola-backend.onrender.com`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Backend used when `BACKEND_URL` is not set.
pub const DEFAULT_BACKEND_URL: &str = "https://nikola-backend.onrender.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// `PostgreSQL` URL for the session store (contains password)
    pub database_url: Option<SecretString>,
    /// Stylesheets and scripts mounted at `/static`
    pub static_dir: PathBuf,
    /// Public storefront URL
    pub storefront_url: String,
    /// REST backend configuration
    pub backend: BackendConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL without a trailing slash
    pub url: String,
}

impl BackendConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        url::Url::parse(url)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
        })
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `ADMIN_BASE_URL` is missing or a variable is
    /// present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ADMIN_BASE_URL")?;
        let database_url = get_database_url("ADMIN_DATABASE_URL");
        let static_dir = PathBuf::from(get_env_or_default("ADMIN_STATIC_DIR", "crates/admin/static"));
        let storefront_url = get_env_or_default("ADMIN_STOREFRONT_URL", "http://localhost:3000");
        let backend = BackendConfig::new(&get_env_or_default("BACKEND_URL", DEFAULT_BACKEND_URL))?;
        let sentry_sample_rate = get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?;

        Ok(Self {
            host,
            port,
            base_url,
            database_url,
            static_dir,
            storefront_url,
            backend,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for tests and local tooling: in-memory sessions,
    /// loopback address, the given backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `backend_url` does not parse.
    pub fn local(backend_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost".to_string(),
            database_url: None,
            static_dir: PathBuf::from("crates/admin/static"),
            storefront_url: "http://localhost:3000".to_string(),
            backend: BackendConfig::new(backend_url)?,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .filter(|url| !url.trim().is_empty())
        .map(SecretString::from)
}

/// Get a Sentry sample rate, checking it lies in 0.0..=1.0.
fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    parse_sample_rate(&raw).map_err(|reason| ConfigError::InvalidEnvVar(key.to_string(), reason))
}

fn parse_sample_rate(raw: &str) -> Result<f32, String> {
    let rate = raw.trim().parse::<f32>().map_err(|e| e.to_string())?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("must be between 0.0 and 1.0 (got {rate})"))
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let mut config = AdminConfig::local("http://127.0.0.1:9000").unwrap();
        config.port = 3001;

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_parse_sample_rate() {
        assert!((parse_sample_rate("0.25").unwrap() - 0.25).abs() < f32::EPSILON);
        assert!(parse_sample_rate("1.5").is_err());
        assert!(parse_sample_rate("lots").is_err());
    }

    #[test]
    fn test_backend_url_trailing_slash_trimmed() {
        let config = AdminConfig::local("http://127.0.0.1:9000/").unwrap();
        assert_eq!(config.backend.url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let mut config = AdminConfig::local("http://127.0.0.1:9000").unwrap();
        config.database_url = Some(SecretString::from("postgres://admin:hunter22@db/np"));
        assert!(!format!("{config:?}").contains("hunter22"));
    }

    #[test]
    fn test_is_secure() {
        let mut config = AdminConfig::local("http://127.0.0.1:9000").unwrap();
        assert!(!config.is_secure());
        config.base_url = "https://admin.example.com".to_string();
        assert!(config.is_secure());
    }
}
