//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Store;
use crate::services::auth::{AuthService, PasswordError, PasswordVerifier, TokenIssuer};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("session issuer: {0}")]
    Issuer(#[from] crate::services::auth::IssuerError),
    #[error("password verifier: {0}")]
    Verifier(#[from] PasswordError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The signing secret inside the
/// issuer is the only authentication state, and it is read-only.
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

struct AppStateInner<S> {
    config: ServerConfig,
    store: S,
    issuer: TokenIssuer,
    verifier: PasswordVerifier,
}

// Manual impl: `S` itself does not need to be `Clone` for the handle to be.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Store> AppState<S> {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session secret is empty or the decoy password
    /// hash cannot be derived. Either way the server must not start.
    pub fn new(config: ServerConfig, store: S) -> Result<Self, StateError> {
        let issuer = TokenIssuer::new(&config.session_secret)?;
        let verifier = PasswordVerifier::new()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                issuer,
                verifier,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Get a reference to the session token issuer.
    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.inner.issuer
    }

    /// An authentication service bound to this state.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_, S> {
        AuthService::new(&self.inner.store, &self.inner.verifier, &self.inner.issuer)
    }
}
