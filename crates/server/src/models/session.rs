//! Request-scoped authentication context.

use shopkart_core::{Role, UserId};

/// Identity attached to a request by the authorization gate.
///
/// Derived from a validated session token plus a fresh role lookup. It lives
/// for one request and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Authenticated user.
    pub user_id: UserId,
    /// Role as currently stored for that user.
    pub role: Role,
}
