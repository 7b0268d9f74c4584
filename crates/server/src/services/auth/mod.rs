//! Authentication service.
//!
//! Turns credentials into sessions and manages the account data behind them.
//!
//! # Login
//!
//! [`AuthService::login`] classifies every failure at the point it is
//! detected:
//!
//! 1. absent or empty email/password: `MissingCredentials`, no lookup
//! 2. no such account: `UnknownUser`, after hashing against a decoy so the
//!    response takes as long as a wrong password would
//! 3. digest mismatch: `WrongPassword`
//!
//! On success a fresh session token is minted for the user's ID. Argon2 is
//! CPU-bound, so verification runs on the blocking pool.

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::{PasswordCheck, PasswordError, PasswordVerifier, hash_password};
pub use token::{IssuerError, TokenError, TokenIssuer};

use shopkart_core::{Email, Role, UpdateDetailsRequest, UserId};

use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, ProfileUpdate, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

/// Input for a self-service registration.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'r> {
    pub name: &'r str,
    pub email: &'r str,
    pub password: &'r str,
    pub phone: Option<&'r str>,
    pub address: Option<&'r str>,
}

/// Authentication service.
///
/// Borrows its collaborators for the duration of one request.
pub struct AuthService<'a, S, V = PasswordVerifier> {
    users: &'a S,
    verifier: &'a V,
    issuer: &'a TokenIssuer,
}

impl<'a, S: UserStore, V: PasswordCheck> AuthService<'a, S, V> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a S, verifier: &'a V, issuer: &'a TokenIssuer) -> Self {
        Self {
            users,
            verifier,
            issuer,
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials`, `AuthError::UnknownUser` or
    /// `AuthError::WrongPassword` for the classified failures; anything else
    /// is an internal fault.
    pub async fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<LoginOutcome, AuthError> {
        let (Some(email), Some(password)) = (non_empty(email), non_empty(password)) else {
            return Err(AuthError::MissingCredentials);
        };

        // An address that cannot be stored cannot have an account.
        let found = match Email::parse(email) {
            Ok(email) => self.users.get_credentials(&email).await?,
            Err(_) => None,
        };

        let Some((user, password_hash)) = found else {
            self.burn_decoy(password).await?;
            return Err(AuthError::UnknownUser);
        };

        if !self.verify(password, password_hash).await? {
            return Err(AuthError::WrongPassword);
        }

        let token = self.issuer.issue(user.id)?;
        Ok(LoginOutcome { user, token })
    }

    /// Register a customer account.
    ///
    /// The role is always `customer`; only an operator can grant `admin`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` if the name is empty.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, input: Registration<'_>) -> Result<User, AuthError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidInput("name is required".to_owned()));
        }
        let email = Email::parse(input.email)?;
        validate_password(input.password)?;

        let password = input.password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))??;

        let new = NewUser {
            name: name.to_owned(),
            email,
            password_hash,
            phone: non_empty(input.phone).map(str::to_owned),
            address: non_empty(input.address).map(str::to_owned),
            role: Role::Customer,
        };

        self.users.create(&new).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })
    }

    /// Apply a profile edit to the authenticated user.
    ///
    /// Empty strings are treated as "leave unchanged".
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the new email is malformed.
    /// Returns `AuthError::UserAlreadyExists` if the new email is taken.
    /// Returns `AuthError::UserNotFound` if the user was deleted.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        request: &UpdateDetailsRequest,
    ) -> Result<User, AuthError> {
        let update = ProfileUpdate {
            name: non_empty(request.new_name.as_deref()).map(str::to_owned),
            email: non_empty(request.new_email.as_deref())
                .map(Email::parse)
                .transpose()?,
            phone: non_empty(request.new_phone.as_deref()).map(str::to_owned),
        };

        if update.is_empty() {
            return self
                .users
                .get_by_id(user_id)
                .await?
                .ok_or(AuthError::UserNotFound);
        }

        self.users
            .update_profile(user_id, &update)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?
            .ok_or(AuthError::UserNotFound)
    }

    async fn verify(&self, password: &str, password_hash: String) -> Result<bool, AuthError> {
        let verifier = self.verifier.clone();
        let password = password.to_owned();

        let matched = tokio::task::spawn_blocking(move || verifier.verify(&password, &password_hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))??;
        Ok(matched)
    }

    async fn burn_decoy(&self, password: &str) -> Result<(), AuthError> {
        let verifier = self.verifier.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || verifier.verify_decoy(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
