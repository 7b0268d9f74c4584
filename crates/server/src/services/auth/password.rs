//! Password hashing and verification (Argon2id).
//!
//! Verification compares digests in constant time (the `password-hash`
//! output type compares with `subtle`), so the position of the first
//! differing byte does not show up in timing.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
        rand_core::OsRng,
    },
};
use thiserror::Error;

/// Password hashing failures. A mismatch is not an error.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The stored hash is not a PHC string this verifier understands.
    #[error("malformed password hash: {0}")]
    MalformedHash(password_hash::Error),

    /// Hashing a new password failed.
    #[error("password hashing failed: {0}")]
    Hash(password_hash::Error),
}

/// Hash a password using Argon2id with a fresh random salt.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// The password checks a login performs.
///
/// Both run on the blocking pool, so implementors must be cheap to clone.
pub trait PasswordCheck: Clone + Send + Sync + 'static {
    /// Check `password` against `stored_hash`. `Ok(false)` on mismatch.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::MalformedHash` if `stored_hash` is unusable.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError>;

    /// Do the work of a failed [`verify`](Self::verify) for an absent account.
    fn verify_decoy(&self, password: &str);
}

/// Verifies plaintext passwords against stored hashes.
///
/// Holds a decoy hash so that a login for an unknown account performs the
/// same Argon2 work as one with a wrong password.
#[derive(Clone)]
pub struct PasswordVerifier {
    decoy: Arc<str>,
}

impl std::fmt::Debug for PasswordVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordVerifier").finish_non_exhaustive()
    }
}

impl PasswordVerifier {
    /// Create a verifier, deriving a fresh decoy hash.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::Hash` if the decoy cannot be hashed.
    pub fn new() -> Result<Self, PasswordError> {
        let decoy = hash_password("decoy password for absent accounts")?;
        Ok(Self {
            decoy: Arc::from(decoy),
        })
    }

    /// Check `password` against `stored_hash`.
    ///
    /// Returns `Ok(false)` on mismatch.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::MalformedHash` only if `stored_hash` cannot be
    /// parsed or uses parameters Argon2 rejects.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(stored_hash).map_err(PasswordError::MalformedHash)?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedHash(e)),
        }
    }

    /// Spend the same effort as [`verify`](Self::verify) and discard the result.
    pub fn verify_decoy(&self, password: &str) {
        let _ = self.verify(password, &self.decoy);
    }
}

impl PasswordCheck for PasswordVerifier {
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        Self::verify(self, password, stored_hash)
    }

    fn verify_decoy(&self, password: &str) {
        Self::verify_decoy(self, password);
    }
}
