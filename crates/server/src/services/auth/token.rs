//! Session token issuing and validation.
//!
//! Tokens are HS256 JWTs signed with the server-held secret. They are
//! stateless: nothing is stored server-side and the only way a token stops
//! working is reaching its `exp`.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use shopkart_core::{SessionClaims, UserId};

/// Why a token was rejected.
///
/// Callers treat every variant the same way (unauthenticated); the split only
/// exists for diagnostics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Not a JWT, wrong algorithm, or the claims are not the expected JSON.
    #[error("malformed token")]
    Malformed,

    /// Signature does not match the claims.
    #[error("bad token signature")]
    BadSignature,

    /// Signature is fine but the expiry has passed.
    #[error("token expired")]
    Expired,

    /// Claims could not be signed.
    #[error("token encoding failed")]
    Encoding,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::BadSignature,
            _ => Self::Malformed,
        }
    }
}

/// The issuer could not be built.
#[derive(Debug, Error)]
pub enum IssuerError {
    /// No signing secret was provided.
    #[error("session signing secret is empty")]
    EmptySecret,
}

/// Mints and validates session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenIssuer {
    /// Create an issuer over `secret`.
    ///
    /// # Errors
    ///
    /// Returns `IssuerError::EmptySecret` if the secret is empty. The server
    /// treats this as fatal at startup.
    pub fn new(secret: &SecretString) -> Result<Self, IssuerError> {
        let secret = secret.expose_secret().as_bytes();
        if secret.is_empty() {
            return Err(IssuerError::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is dead from its `exp` second on.
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Issue a token for `subject`, valid for the fixed session lifetime from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if the claims cannot be signed.
    pub fn issue(&self, subject: UserId) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if the claims cannot be signed.
    pub fn issue_at(&self, subject: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = SessionClaims::starting_at(subject, now);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to sign session token");
                TokenError::Encoding
            })
    }

    /// Validate a token against the current time.
    ///
    /// Validation has no side effects; the same token may be checked any
    /// number of times.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] if the token is malformed, forged or expired.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims = self.decode(token, &self.validation)?;
        // jsonwebtoken still accepts a token in its `exp` second.
        if !claims.is_live_at(Utc::now()) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] if the token is malformed, forged or expired.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;

        let claims = self.decode(token, &validation)?;
        if !claims.is_live_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn decode(&self, token: &str, validation: &Validation) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, validation)
            .inspect_err(|e| tracing::debug!(error = %e, "Session token rejected"))?;
        Ok(data.claims)
    }
}
