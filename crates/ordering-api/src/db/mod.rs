//! Database setup for the ordering store.
//!
//! # Database: `orderingdb`
//!
//! ## Tables (schema `ordering`)
//!
//! - `buyers` - Buyers keyed by identity subject
//! - `orders` - Order headers and shipping address
//! - `order_items` - Order lines
//! - `card_types` - Payment card reference data (seeded)
//!
//! # Migrations
//!
//! Migrations live in `crates/ordering-api/migrations/` and run at startup
//! unless `ORDERING_RUN_MIGRATIONS=false`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
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
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply pending schema migrations, including the card type seed.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
