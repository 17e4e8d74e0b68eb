//! Session-store migration command.
//!
//! The storefront's only schema is the tower-sessions table; the store ships
//! its own migration, so this command just runs it against the configured
//! database.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)

use secrecy::SecretString;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

/// Errors that can occur while migrating the session store.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create/upgrade the tower-sessions schema.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn sessions() -> Result<(), MigrateError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrateError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    let pool = larkspur_storefront::db::create_pool(&database_url).await?;

    tracing::info!("Running session-store migrations...");
    let store = PostgresStore::new(pool);
    store.migrate().await?;

    tracing::info!("Session-store migrations complete!");
    Ok(())
}
