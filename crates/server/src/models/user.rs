//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.
//! The password hash is deliberately not a field of [`User`]: it only travels
//! alongside a user when the login path asks for it.

use chrono::{DateTime, Utc};

use shopkart_core::{Email, PublicUser, Role, UserId};

/// A registered user (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login identifier, unique across users.
    pub email: Email,
    /// Contact phone.
    pub phone: Option<String>,
    /// Shipping address.
    pub address: Option<String>,
    /// Permission class.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Projection that is safe to send to clients.
    #[must_use]
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            role: self.role,
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    /// Argon2 PHC string, never plaintext.
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

/// Partial profile edit. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}
