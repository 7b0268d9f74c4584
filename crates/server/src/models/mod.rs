//! Domain models for the server.
//!
//! - [`user`] - Users as stored, plus the inputs used to create and edit them
//! - [`session`] - Request-scoped authentication context

pub mod session;
pub mod user;

pub use session::AuthContext;
pub use user::{NewUser, ProfileUpdate, User};
