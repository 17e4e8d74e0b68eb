//! Database operations for the storefront `PostgreSQL` instance.
//!
//! The database backs exactly one thing: the tower-sessions store. Products,
//! carts, users, and orders all live in the commerce API - there is no local
//! mirror and no domain schema.
//!
//! ## Tables
//!
//! - `tower_sessions.session` - created via `lark-cli migrate`

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
