//! Authorization gate.
//!
//! Two extractors, layered:
//!
//! - [`RequireAuth`] answers "who is calling?". It reads the `Authorization`
//!   header, validates the session token and re-reads the user's role from
//!   the store. Any failure is `401 unauthenticated`.
//! - [`Authorized<A>`] answers "may they do `A`?". It runs `RequireAuth`, then
//!   consults the permission table for the action `A` names. A disallowed
//!   role is `403 forbidden`.
//!
//! Handlers declare the action in their signature, so the permission check
//! cannot be skipped and never lives in the handler body.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn update_wishlist<S: Store>(
//!     Authorized { auth, .. }: Authorized<EditWishlist>,
//!     State(state): State<AppState<S>>,
//! ) -> Result<Json<WishlistUpdateResponse>> {
//!     // only customers get here
//! }
//! ```

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use shopkart_core::Action;

use crate::db::Store;
use crate::error::{AppError, set_sentry_user};
use crate::models::AuthContext;
use crate::state::AppState;

const NOT_LOGGED_IN: &str = "Please log in to continue";
const SESSION_INVALID: &str = "Your session has expired, please log in again";

/// Extractor that requires a valid session.
pub struct RequireAuth(pub AuthContext);

impl<S: Store> FromRequestParts<AppState<S>> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(&parts.headers).ok_or(AppError::Unauthenticated(NOT_LOGGED_IN))?;

        let claims = state.issuer().validate(token).map_err(|e| {
            tracing::debug!(reason = %e, "session token rejected");
            AppError::Unauthenticated(SESSION_INVALID)
        })?;

        // The role is not in the token; a role change applies on the next request.
        let user = state
            .store()
            .get_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id = %claims.sub, "session for deleted user");
                AppError::Unauthenticated(SESSION_INVALID)
            })?;

        tracing::Span::current().record("user_id", user.id.as_i32());
        set_sentry_user(&user.id);

        Ok(Self(AuthContext {
            user_id: user.id,
            role: user.role,
        }))
    }
}

/// An action guarded by the permission table.
pub trait GuardedAction: Send + Sync + 'static {
    /// The table entry to consult.
    const ACTION: Action;
}

/// Extractor that requires a valid session whose role may perform `A`.
pub struct Authorized<A> {
    /// The caller's identity and role.
    pub auth: AuthContext,
    _action: PhantomData<fn() -> A>,
}

impl<S: Store, A: GuardedAction> FromRequestParts<AppState<S>> for Authorized<A> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(auth) = RequireAuth::from_request_parts(parts, state).await?;

        if !A::ACTION.permits(auth.role) {
            tracing::info!(
                user_id = %auth.user_id,
                role = %auth.role,
                action = %A::ACTION,
                "action forbidden for role"
            );
            return Err(AppError::Forbidden(A::ACTION));
        }

        Ok(Self {
            auth,
            _action: PhantomData,
        })
    }
}

macro_rules! guarded_actions {
    ($($(#[$meta:meta])* $name:ident => $action:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl GuardedAction for $name {
                const ACTION: Action = Action::$action;
            }
        )*
    };
}

guarded_actions! {
    /// Enter the shopper dashboard.
    UserDashboard => AccessUserDashboard;
    /// Enter the admin dashboard.
    AdminDashboard => AccessAdminDashboard;
    /// Edit one's own profile.
    EditProfile => UpdateProfile;
    /// Read one's own wishlist.
    ReadWishlist => ViewWishlist;
    /// Add or remove wishlist entries.
    EditWishlist => UpdateWishlist;
}

/// Pull the session token out of the `Authorization` header.
///
/// Accepts `Bearer <token>` as well as the bare token, which is what the
/// browser client sends.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    if value.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        None => value,
    };

    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_prefix() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer  abc")), Some("abc"));
    }

    #[test]
    fn test_raw_token() {
        assert_eq!(bearer_token(&headers("abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_or_empty() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers("")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
    }

    #[test]
    fn test_marker_actions() {
        assert_eq!(EditWishlist::ACTION, Action::UpdateWishlist);
        assert_eq!(AdminDashboard::ACTION, Action::AccessAdminDashboard);
    }
}
