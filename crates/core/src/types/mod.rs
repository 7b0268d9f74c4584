//! Core types for Shopkart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod api;
pub mod claims;
pub mod email;
pub mod id;
pub mod permission;
pub mod product;
pub mod role;

pub use api::*;
pub use claims::{SESSION_LIFETIME_DAYS, SessionClaims};
pub use email::{Email, EmailError};
pub use id::*;
pub use permission::Action;
pub use product::{ProductId, ProductIdError};
pub use role::Role;
