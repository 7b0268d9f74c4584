//! Business logic services for the server.
//!
//! # Services
//!
//! - `auth` - Password verification, session tokens, login, registration and
//!   profile edits
//!
//! Services borrow the store and the shared crypto state from
//! [`AppState`](crate::state::AppState) for one request; they hold no state
//! of their own.

pub mod auth;
