//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every failure leaves the server as `{success: false, message, errorType}`.
//! Internal faults get a fixed message; their details only reach the logs.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use shopkart_core::{Action, ErrorBody, ErrorType};

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Message for every 5xx response.
pub const INTERNAL_MESSAGE: &str = "Something went wrong, please try again later";

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// No valid session.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(&'static str),

    /// Valid session, but the role may not perform the action.
    #[error("Forbidden: {0}")]
    Forbidden(Action),

    /// No route matches the request.
    #[error("Not found: {0}")]
    NotFound(&'static str),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::MissingCredentials
                | AuthError::UnknownUser
                | AuthError::WrongPassword
                | AuthError::InvalidCredentials
                | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Password(_)
                | AuthError::Token(_)
                | AuthError::Repository(_)
                | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Wire classification for this error.
    #[must_use]
    pub const fn error_type(&self) -> ErrorType {
        match self {
            Self::Database(_) => ErrorType::Internal,
            Self::Auth(err) => err.error_type(),
            Self::Unauthenticated(_) => ErrorType::Unauthenticated,
            Self::Forbidden(_) => ErrorType::Forbidden,
            Self::NotFound(_) => ErrorType::NotFound,
            Self::BadRequest(_) => ErrorType::BadRequest,
        }
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return INTERNAL_MESSAGE.to_string();
        }

        match self {
            Self::Auth(err) => match err {
                AuthError::MissingCredentials | AuthError::InvalidCredentials => {
                    "Invalid username or password".to_string()
                }
                AuthError::UnknownUser => "User Not Registered!".to_string(),
                AuthError::WrongPassword => "Invalid Password!".to_string(),
                AuthError::UserNotFound => "Please log in again".to_string(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidInput(msg) => capitalize(msg),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                _ => INTERNAL_MESSAGE.to_string(),
            },
            Self::Unauthenticated(msg) => (*msg).to_string(),
            Self::Forbidden(action) => action.denial_message().to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
            Self::Database(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody::new(self.error_type(), self.public_message());
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

fn capitalize(msg: &str) -> String {
    let mut chars = msg.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
