//! Session token claims.
//!
//! The server signs these claims; the client only reads them (without
//! verifying) to learn when its stored token expires.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Fixed session lifetime.
pub const SESSION_LIFETIME_DAYS: i64 = 7;

/// Payload carried inside a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl SessionClaims {
    /// Claims for a session starting at `issued_at` with the fixed lifetime.
    #[must_use]
    pub fn starting_at(sub: UserId, issued_at: DateTime<Utc>) -> Self {
        let expires_at = issued_at + Duration::days(SESSION_LIFETIME_DAYS);
        Self {
            sub,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Expiry as a timestamp, `None` if out of chrono's range.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// A session is live strictly before its expiry instant.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() < self.exp
    }
}
