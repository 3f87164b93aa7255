//! Session table migrations.
//!
//! Both binaries keep sessions in `PostgreSQL` when a database URL is set.
//! Tables are never created on startup; run these once per database.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront sessions (`tower_sessions.session`)
//! - `ADMIN_DATABASE_URL` - admin sessions (`admin.session`)
//! - `DATABASE_URL` - fallback for either

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use nikola_admin::middleware::session::{SessionStoreError, postgres_store};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Neither the specific nor the generic database URL is set.
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),

    /// Database connection or DDL error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid session schema or table name.
    #[error("Session store error: {0}")]
    SessionStore(#[from] SessionStoreError),
}

/// Database URL from `var`, falling back to `DATABASE_URL`.
fn database_url(var: &'static str) -> Result<SecretString, MigrationError> {
    std::env::var(var)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.is_empty())
        .map(SecretString::from)
        .ok_or(MigrationError::MissingEnvVar(var))
}

async fn connect(var: &'static str) -> Result<PgPool, MigrationError> {
    dotenvy::dotenv().ok();
    let url = database_url(var)?;
    Ok(PgPool::connect(url.expose_secret()).await?)
}

/// Create the storefront session table.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the DDL fails.
pub async fn storefront() -> Result<(), MigrationError> {
    tracing::info!("Connecting to storefront database...");
    let pool = connect("STOREFRONT_DATABASE_URL").await?;

    tracing::info!("Creating storefront session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}

/// Create the admin schema and session table.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the DDL fails.
pub async fn admin() -> Result<(), MigrationError> {
    tracing::info!("Connecting to admin database...");
    let pool = connect("ADMIN_DATABASE_URL").await?;

    tracing::info!("Creating admin session table...");
    postgres_store(pool)?.migrate().await?;

    tracing::info!("Admin migrations complete");
    Ok(())
}
