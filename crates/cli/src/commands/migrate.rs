//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shopkart migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPKART_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations are embedded from `crates/server/migrations/`:
//! ```text
//! migrations/
//! ├── 20260301000001_create_users.sql
//! └── 20260301000002_create_wishlist.sql
//! ```

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use shopkart_server::config::{ConfigError, ServerConfig};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Database URL is not configured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = ServerConfig::database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
