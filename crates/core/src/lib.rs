//! Shopkart Core - Shared types library.
//!
//! This crate provides common types used across all Shopkart components:
//! - `server` - REST backend (authentication, wishlist, profile)
//! - `client` - HTTP client with session context and optimistic wishlist
//! - `cli` - Command-line tools for migrations, user management and client actions
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, the permission table, session
//!   claims and the JSON wire format shared by server and client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
