//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

use shopkart_core::{ErrorBody, ErrorType};

/// Errors that can occur when talking to the Shopkart API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a classified error body.
    #[error("API error ({status}): {}", .body.message)]
    Api { status: StatusCode, body: ErrorBody },

    /// The server answered with a non-success status and no error body.
    #[error("unexpected response ({status})")]
    UnexpectedStatus { status: StatusCode },

    /// Base URL could not be parsed or joined.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The session token is not a well-formed session token.
    #[error("invalid session token")]
    InvalidToken,

    /// Token file could not be read or written.
    #[error("token store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Token file contents are not valid JSON.
    #[error("token store format error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } | Self::UnexpectedStatus { status } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Server-side failure class, if the server sent one.
    #[must_use]
    pub const fn error_type(&self) -> Option<ErrorType> {
        match self {
            Self::Api { body, .. } => Some(body.error_type),
            _ => None,
        }
    }

    /// The server's user-facing message, if it sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } => Some(body.message.as_str()),
            _ => None,
        }
    }

    /// No valid session: the caller should log in again.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Valid session, but the role may not do this.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_classification() {
        let err = ClientError::Api {
            status: StatusCode::FORBIDDEN,
            body: ErrorBody::new(ErrorType::Forbidden, "nope"),
        };
        assert!(err.is_forbidden());
        assert!(!err.is_unauthenticated());
        assert_eq!(err.error_type(), Some(ErrorType::Forbidden));
        assert_eq!(err.server_message(), Some("nope"));
    }

    #[test]
    fn test_statusless_errors() {
        assert_eq!(ClientError::InvalidToken.status(), None);
        assert!(!ClientError::InvalidToken.is_forbidden());
    }
}
