//! Authentication error types.

use thiserror::Error;

use shopkart_core::{EmailError, ErrorType};

use super::password::PasswordError;
use super::token::TokenError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password absent or empty. No lookup was performed.
    #[error("missing credentials")]
    MissingCredentials,

    /// No account for the given email.
    #[error("user not registered")]
    UnknownUser,

    /// Account exists but the password did not match.
    #[error("wrong password")]
    WrongPassword,

    /// Login failed; which of the above happened is not disclosed.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Invalid email format (registration and profile edits).
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A required field was empty or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Authenticated user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Password hashing error.
    #[error("password hashing error: {0}")]
    Password(#[from] PasswordError),

    /// Token minting failed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Blocking task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Collapse `UnknownUser` and `WrongPassword` into `InvalidCredentials`.
    #[must_use]
    pub fn generalized(self) -> Self {
        match self {
            Self::UnknownUser | Self::WrongPassword => Self::InvalidCredentials,
            other => other,
        }
    }

    /// Whether this is one of the classified login failures.
    #[must_use]
    pub const fn is_login_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials
                | Self::UnknownUser
                | Self::WrongPassword
                | Self::InvalidCredentials
        )
    }

    /// Wire classification for this error.
    #[must_use]
    pub const fn error_type(&self) -> ErrorType {
        match self {
            Self::MissingCredentials | Self::InvalidCredentials => ErrorType::InvalidCredentials,
            Self::UnknownUser => ErrorType::InvalidUser,
            Self::WrongPassword => ErrorType::InvalidPassword,
            Self::InvalidEmail(_) | Self::WeakPassword(_) | Self::InvalidInput(_) => {
                ErrorType::BadRequest
            }
            Self::UserAlreadyExists => ErrorType::Conflict,
            Self::UserNotFound => ErrorType::Unauthenticated,
            Self::Password(_) | Self::Token(_) | Self::Repository(_) | Self::Internal(_) => {
                ErrorType::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generalized_hides_which_step_failed() {
        assert!(matches!(
            AuthError::UnknownUser.generalized(),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::WrongPassword.generalized(),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::MissingCredentials.generalized(),
            AuthError::MissingCredentials
        ));
    }

    #[test]
    fn test_login_failures_are_classified() {
        assert_eq!(AuthError::UnknownUser.error_type(), ErrorType::InvalidUser);
        assert_eq!(
            AuthError::WrongPassword.error_type(),
            ErrorType::InvalidPassword
        );
        assert_eq!(
            AuthError::MissingCredentials.error_type(),
            ErrorType::InvalidCredentials
        );
        assert!(AuthError::UnknownUser.is_login_failure());
        assert!(!AuthError::UserAlreadyExists.is_login_failure());
    }
}
