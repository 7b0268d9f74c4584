//! HTTP route handlers for the server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness
//! GET  /health/ready                  - Readiness (store reachable)
//!
//! # Auth
//! POST /api/v1/auth/login             - Credentials to session token (rate limited)
//! POST /api/v1/auth/register          - Create a customer account
//! GET  /api/v1/auth/user-auth         - Customer dashboard access check
//! GET  /api/v1/auth/admin-auth        - Admin dashboard access check
//! POST /api/v1/auth/update-details    - Edit own profile
//!
//! # Wishlist (customers only)
//! GET  /api/v1/user/wishlist          - Current membership set
//! POST /api/v1/user/update-wishlist   - Add, remove or toggle one product
//! ```

pub mod auth;
pub mod user;

use axum::{
    Router,
    routing::{get, post},
};

use crate::db::Store;
use crate::middleware::RateLimiterLayer;
use crate::state::AppState;

/// Create the auth routes router.
///
/// `login_limiter` wraps the login route only.
pub fn auth_routes<S: Store>(login_limiter: Option<RateLimiterLayer>) -> Router<AppState<S>> {
    let mut login = Router::new().route("/login", post(auth::login::<S>));
    if let Some(limiter) = login_limiter {
        login = login.layer(limiter);
    }

    Router::new()
        .route("/register", post(auth::register::<S>))
        .route("/user-auth", get(auth::user_auth))
        .route("/admin-auth", get(auth::admin_auth))
        .route("/update-details", post(auth::update_details::<S>))
        .merge(login)
}

/// Create the wishlist routes router.
pub fn user_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/wishlist", get(user::wishlist::<S>))
        .route("/update-wishlist", post(user::update_wishlist::<S>))
}

/// Create all API routes.
pub fn routes<S: Store>(login_limiter: Option<RateLimiterLayer>) -> Router<AppState<S>> {
    Router::new()
        .nest("/api/v1/auth", auth_routes(login_limiter))
        .nest("/api/v1/user", user_routes())
}
