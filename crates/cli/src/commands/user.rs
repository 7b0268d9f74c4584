//! User management commands.
//!
//! These talk to the database directly. `set-role` is the only way a role
//! ever changes; the API has no endpoint for it.
//!
//! # Usage
//!
//! ```bash
//! shopkart user create -e admin@example.com -n "Admin Name" -r admin
//! shopkart user set-role -e ada@example.com -r customer
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPKART_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `SHOPKART_NEW_USER_PASSWORD` - password for `user create` when `-p` is omitted

use thiserror::Error;

use shopkart_core::{Email, EmailError, Role, UserId};
use shopkart_server::config::{ConfigError, ServerConfig};
use shopkart_server::db::{self, PgStore, RepositoryError, UserStore};
use shopkart_server::models::NewUser;
use shopkart_server::services::auth::{MIN_PASSWORD_LENGTH, PasswordError, hash_password};

use super::output;

/// Errors that can occur during user management.
#[derive(Debug, Error)]
pub enum UserError {
    /// Database URL is not configured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Name is blank.
    #[error("Name must not be empty")]
    EmptyName,

    /// Password too short.
    #[error("Password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    WeakPassword,

    /// Password could not be hashed.
    #[error("Password hashing failed: {0}")]
    Password(#[from] PasswordError),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// No user with that email.
    #[error("No user with email: {0}")]
    UserNotFound(String),
}

async fn connect() -> Result<PgStore, UserError> {
    let database_url = ServerConfig::database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;
    Ok(PgStore::new(pool))
}

/// Create a user with the given role.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error if the input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
    role: Role,
) -> Result<UserId, UserError> {
    let email = Email::parse(email)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(UserError::EmptyName);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserError::WeakPassword);
    }

    let store = connect().await?;
    let password_hash = hash_password(password)?;

    tracing::info!("Creating user: {} ({})", email, role);

    let user = store
        .create(&NewUser {
            name: name.to_string(),
            email: email.clone(),
            password_hash,
            phone: None,
            address: None,
            role,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(email.to_string()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, "User created");
    output(format_args!(
        "Created {} user {} (ID {})",
        user.role, user.email, user.id
    ));
    Ok(user.id)
}

/// Change the role of the user with `email`.
///
/// Takes effect on that user's next request; existing sessions are not
/// reissued because the role is read from the database every time.
///
/// # Errors
///
/// Returns `UserError::UserNotFound` if no user has that email.
pub async fn set_role(email: &str, role: Role) -> Result<(), UserError> {
    let email = Email::parse(email)?;
    let store = connect().await?;

    if !store.set_role(&email, role).await? {
        return Err(UserError::UserNotFound(email.to_string()));
    }

    tracing::info!(%email, %role, "Role changed");
    output(format_args!("{email} is now {role}"));
    Ok(())
}
