//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (falls back to `PORT`, then 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:<port>`)
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` URL for persistent sessions
//!   (falls back to `DATABASE_URL`; in-memory sessions when neither is set)
//! - `STOREFRONT_DIST_DIR` - Directory served by the static fallback (default: dist)
//! - `STOREFRONT_STATIC_DIR` - Stylesheets and scripts (default: crates/storefront/static)
//! - `STOREFRONT_ADMIN_URL` - Where admin accounts land after login
//!   (default: `http://localhost:3001`)
//! - `BACKEND_URL` - REST backend (default: `https://nikola-backend.onrender.com`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Backend used when `BACKEND_URL` is not set.
pub const DEFAULT_BACKEND_URL: &str = "https://nikola-backend.onrender.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// `PostgreSQL` URL for the session store (contains password)
    pub database_url: Option<SecretString>,
    /// Built client bundle served by the fallback
    pub dist_dir: PathBuf,
    /// Stylesheets and scripts mounted at `/static`
    pub static_dir: PathBuf,
    /// Admin panel URL
    pub admin_url: String,
    /// REST backend configuration
    pub backend: BackendConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment
    pub sentry_environment: Option<String>,
}

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL without a trailing slash
    pub url: String,
}

impl BackendConfig {
    /// Build from a base URL, validating it and trimming any trailing slash.
    ///
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

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let (port_var, port) = get_optional_env("STOREFRONT_PORT")
            .map(|p| ("STOREFRONT_PORT", p))
            .or_else(|| get_optional_env("PORT").map(|p| ("PORT", p)))
            .unwrap_or(("STOREFRONT_PORT", "3000".to_string()));
        let port = port
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar(port_var.to_string(), e.to_string()))?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", &format!("http://localhost:{port}"));
        let database_url = get_database_url("STOREFRONT_DATABASE_URL");
        let dist_dir = PathBuf::from(get_env_or_default("STOREFRONT_DIST_DIR", "dist"));
        let static_dir = PathBuf::from(get_env_or_default(
            "STOREFRONT_STATIC_DIR",
            "crates/storefront/static",
        ));
        let admin_url = get_env_or_default("STOREFRONT_ADMIN_URL", "http://localhost:3001");
        let backend = BackendConfig::new(&get_env_or_default("BACKEND_URL", DEFAULT_BACKEND_URL))?;

        Ok(Self {
            host,
            port,
            base_url,
            database_url,
            dist_dir,
            static_dir,
            admin_url,
            backend,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for tests and local tooling: in-memory sessions,
    /// loopback address, the given backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `backend_url` does not parse.
    pub fn local(backend_url: &str, dist_dir: PathBuf) -> Result<Self, ConfigError> {
        Ok(Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost".to_string(),
            database_url: None,
            dist_dir,
            static_dir: PathBuf::from("crates/storefront/static"),
            admin_url: "http://localhost:3001".to_string(),
            backend: BackendConfig::new(backend_url)?,
            sentry_dsn: None,
            sentry_environment: None,
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

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .filter(|url| !url.trim().is_empty())
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
