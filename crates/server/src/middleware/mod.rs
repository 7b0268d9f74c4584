//! HTTP middleware stack for the server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (one span per request)
//! 3. Request ID (honour or create `x-request-id`, record it on the span)
//! 4. CORS (browser client origin)
//! 5. Rate limiting on the login route (governor)
//!
//! Authentication is not a layer: handlers opt in by taking a
//! [`RequireAuth`] or [`Authorized`] extractor, so public routes never pay for
//! a token check and gated routes cannot forget one.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{Authorized, GuardedAction, RequireAuth};
pub use rate_limit::{RateLimiterLayer, auth_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
