//! Persistence for the server.
//!
//! # Storage seams
//!
//! Handlers and services never talk to a database directly. They go through
//! two traits:
//!
//! - [`UserStore`] - the credential store (lookup by email or id, create,
//!   profile edits, role changes)
//! - [`WishlistStore`] - per-user product membership sets
//!
//! [`Store`] bundles both plus a readiness check. Two implementations exist:
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx (production)
//! - [`memory::MemoryStore`] - in-process maps (tests, local experiments)
//!
//! # Atomicity
//!
//! Every wishlist mutation is a single atomic operation against the store, so
//! concurrent toggles from several devices never lose an update. No locking
//! happens above this layer.
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and are run via:
//! ```bash
//! cargo run -p shopkart-cli -- migrate
//! ```

pub mod memory;
pub mod users;
pub mod wishlist;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shopkart_core::{Email, ProductId, Role, UserId};

use crate::models::{NewUser, ProfileUpdate, User};

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Credential store.
pub trait UserStore: Send + Sync {
    /// Find a user and their password hash by login email.
    fn get_credentials(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<(User, String)>, RepositoryError>> + Send;

    /// Find a user by ID.
    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Insert a user. Fails with `Conflict` if the email is taken.
    fn create(&self, user: &NewUser)
    -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Apply a partial profile edit. Returns `None` if the user does not exist.
    fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Change a user's role. Returns `false` if no user has that email.
    fn set_role(
        &self,
        email: &Email,
        role: Role,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Wishlist membership sets.
pub trait WishlistStore: Send + Sync {
    /// All products on the user's wishlist, in ID order.
    fn list(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<ProductId>, RepositoryError>> + Send;

    /// Add a product. Returns `true` if it was absent before.
    fn add(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Remove a product. Returns `true` if it was present before.
    fn remove(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Flip membership atomically. Returns `true` if the product is now present.
    fn toggle(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Everything the HTTP layer needs from storage.
pub trait Store: UserStore + WishlistStore + Clone + 'static {
    /// Readiness check.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// `PostgreSQL`-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map a unique-violation into `Conflict`, everything else into `Database`.
pub(crate) fn conflict_or_database(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

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
