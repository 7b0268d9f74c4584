//! Client-side session context and token persistence.
//!
//! There is no ambient "current user". A [`SessionContext`] is built from a
//! login response (or restored from disk at startup) and passed to every call
//! that needs it. Logging out is deleting the stored token; the server keeps
//! no session state to revoke.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use shopkart_core::{Action, PublicUser, Role, SessionClaims};

use crate::error::ClientError;

/// An authenticated session.
#[derive(Clone)]
pub struct SessionContext {
    token: SecretString,
    user: PublicUser,
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl SessionContext {
    /// Build a session from a token and the user it was issued to.
    ///
    /// The expiry is read from the token's own claims. The signature is not
    /// checked here; only the server can do that.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidToken` if the token's claims cannot be read.
    pub fn from_token(token: String, user: PublicUser) -> Result<Self, ClientError> {
        let claims = read_claims(&token)?;
        let expires_at = claims.expires_at().ok_or(ClientError::InvalidToken)?;

        Ok(Self {
            token: SecretString::from(token),
            user,
            expires_at,
        })
    }

    /// The bearer token.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    /// The logged-in user.
    #[must_use]
    pub const fn user(&self) -> &PublicUser {
        &self.user
    }

    /// The logged-in user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.user.role
    }

    /// When the token stops being accepted.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token has expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether this session's role may perform `action`.
    ///
    /// Used to hide or disable controls; the server enforces the same table.
    #[must_use]
    pub fn can(&self, action: Action) -> bool {
        action.permits(self.user.role)
    }

    /// Replace the cached user after a profile edit.
    pub fn set_user(&mut self, user: PublicUser) {
        self.user = user;
    }
}

/// Read a session token's claims without verifying it.
///
/// Expiry is not enforced here either; callers compare `exp` themselves.
fn read_claims(token: &str) -> Result<SessionClaims, ClientError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;

    jsonwebtoken::decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "unreadable session token");
            ClientError::InvalidToken
        })
}

/// On-disk form. The expiry is not stored; it is re-read from the token.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: PublicUser,
}

/// Persists a session as a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$SHOPKART_TOKEN_FILE`, else `~/.shopkart/session.json`, else
    /// `./.shopkart-session.json`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("SHOPKART_TOKEN_FILE") {
            return PathBuf::from(path);
        }
        std::env::var_os("HOME").map_or_else(
            || PathBuf::from(".shopkart-session.json"),
            |home| Path::new(&home).join(".shopkart").join("session.json"),
        )
    }

    /// Where the session is stored.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `session`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, session: &SessionContext) -> Result<(), ClientError> {
        let stored = StoredSession {
            token: session.token.expose_secret().to_string(),
            user: session.user.clone(),
        };
        let json = serde_json::to_vec_pretty(&stored)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        Ok(())
    }

    /// Restore the stored session.
    ///
    /// Returns `None` if nothing is stored. An expired or unreadable token is
    /// discarded (the file is removed) and also yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures other than "file not found".
    pub async fn load(&self) -> Result<Option<SessionContext>, ClientError> {
        self.load_at(Utc::now()).await
    }

    /// [`load`](Self::load) as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures other than "file not found".
    pub async fn load_at(&self, now: DateTime<Utc>) -> Result<Option<SessionContext>, ClientError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session = serde_json::from_slice::<StoredSession>(&bytes)
            .ok()
            .and_then(|stored| SessionContext::from_token(stored.token, stored.user).ok());

        match session {
            Some(session) if !session.is_expired_at(now) => Ok(Some(session)),
            Some(_) => {
                tracing::debug!(path = %self.path.display(), "discarding expired session");
                self.clear().await?;
                Ok(None)
            }
            None => {
                tracing::warn!(path = %self.path.display(), "discarding unreadable session file");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Delete the stored session (logout). Succeeds if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use chrono::Duration;

    use shopkart_core::{Email, UserId};

    use super::*;

    /// A well-formed token signed with a key the client never sees.
    pub(crate) fn fake_token(issued_at: DateTime<Utc>, sub: i32) -> String {
        let claims = SessionClaims::starting_at(UserId::new(sub), issued_at);
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap()
    }

    pub(crate) fn user(role: Role) -> PublicUser {
        PublicUser {
            id: UserId::new(1),
            name: "Ada".to_string(),
            email: Email::parse("ada@x.com").unwrap(),
            phone: None,
            address: None,
            role,
        }
    }

    pub(crate) fn session(role: Role) -> SessionContext {
        SessionContext::from_token(fake_token(Utc::now(), 1), user(role)).unwrap()
    }

    #[test]
    fn test_expiry_comes_from_token() {
        let issued = Utc::now();
        let session = SessionContext::from_token(fake_token(issued, 1), user(Role::Customer)).unwrap();

        assert_eq!(
            session.expires_at().timestamp(),
            (issued + Duration::days(7)).timestamp()
        );
        assert!(!session.is_expired());
        assert!(session.is_expired_at(issued + Duration::days(7)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        for token in ["", "a.b", "a.!!!.c", "a.b.c.d"] {
            assert!(matches!(
                SessionContext::from_token(token.to_string(), user(Role::Customer)),
                Err(ClientError::InvalidToken)
            ));
        }
    }

    #[test]
    fn test_permission_table_consulted() {
        assert!(session(Role::Customer).can(Action::UpdateWishlist));
        assert!(!session(Role::Admin).can(Action::UpdateWishlist));
        assert!(session(Role::Admin).can(Action::AccessAdminDashboard));
    }

    #[test]
    fn test_debug_hides_token() {
        let session = session(Role::Customer);
        let token = session.token().expose_secret().to_string();
        assert!(!format!("{session:?}").contains(&token));
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().await.unwrap().is_none());

        let original = session(Role::Customer);
        store.save(&original).await.unwrap();
        let restored = store.load().await.unwrap().unwrap();
        assert_eq!(restored.user(), original.user());
        assert_eq!(restored.expires_at(), original.expires_at());

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_discards_expired_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));
        let issued = Utc::now();
        let session =
            SessionContext::from_token(fake_token(issued, 1), user(Role::Customer)).unwrap();
        store.save(&session).await.unwrap();

        let later = issued + Duration::days(8);
        assert!(store.load_at(later).await.unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_restore_discards_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));
        tokio::fs::write(store.path(), b"not json").await.unwrap();

        assert!(store.load().await.unwrap().is_none());
        assert!(!store.path().exists());
    }
}
