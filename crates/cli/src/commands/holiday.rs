//! Holiday mode commands.
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - REST backend (default: the hosted backend)
//! - `NIKOLA_ADMIN_EMAIL` / `NIKOLA_ADMIN_PASSWORD` - admin account, for `set`

use thiserror::Error;

use nikola_admin::backend::{AdminBackend, BackendError};
use nikola_admin::config::{BackendConfig, ConfigError, DEFAULT_BACKEND_URL};
use nikola_core::account::{AccountError, Credentials};
use nikola_core::promo::{HolidayError, HolidayUpdate};

/// Errors that can occur during holiday commands.
#[derive(Debug, Error)]
pub enum HolidayCommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Bad backend URL.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Malformed credentials.
    #[error("{0}")]
    Credentials(#[from] AccountError),

    /// Discount outside 0-100.
    #[error("{0}")]
    Discount(#[from] HolidayError),

    /// The account signed in but is not an admin.
    #[error("{0} is not an admin account")]
    NotAdmin(String),

    /// Backend request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

fn backend() -> Result<AdminBackend, HolidayCommandError> {
    dotenvy::dotenv().ok();
    let url = std::env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_owned());
    Ok(AdminBackend::new(&BackendConfig::new(&url)?))
}

fn required_env(name: &'static str) -> Result<String, HolidayCommandError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(HolidayCommandError::MissingEnvVar(name))
}

/// Print the current holiday status.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached.
pub async fn status() -> Result<(), HolidayCommandError> {
    let status = backend()?.holiday_status().await?;

    #[allow(clippy::print_stdout)]
    {
        if status.enabled {
            println!("Holiday mode: on ({}% off)", status.discount);
        } else {
            println!("Holiday mode: off");
        }
    }
    Ok(())
}

/// Sign in as an admin and switch holiday mode.
///
/// # Errors
///
/// Returns an error for a bad discount, missing or non-admin credentials,
/// or a refused update.
pub async fn set(enabled: bool, discount: i64) -> Result<(), HolidayCommandError> {
    let update = HolidayUpdate::new(enabled, discount)?;
    let backend = backend()?;

    let credentials = Credentials {
        email: required_env("NIKOLA_ADMIN_EMAIL")?,
        password: required_env("NIKOLA_ADMIN_PASSWORD")?,
    };
    credentials.validate()?;

    let auth = backend.login(&credentials).await?;
    if !auth.role.is_admin() {
        return Err(HolidayCommandError::NotAdmin(credentials.email));
    }

    backend.update_holiday(&update, &auth.token).await?;
    tracing::info!(
        enabled = update.enabled,
        discount = update.discount,
        "Holiday mode updated"
    );
    Ok(())
}
