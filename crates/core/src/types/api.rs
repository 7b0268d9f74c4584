//! JSON wire format shared by the server and the client.
//!
//! Field names follow the REST contract (`camelCase`, `errorType`, `type`),
//! so the browser client and the Rust client read the same payloads.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;
use super::product::ProductId;
use super::role::Role;

// =============================================================================
// Errors
// =============================================================================

/// Machine-readable failure class carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    /// Missing credentials, or a merged login failure.
    InvalidCredentials,
    /// No account for the given email.
    InvalidUser,
    /// Account exists, password did not match.
    InvalidPassword,
    /// No session token, or an invalid/expired one.
    Unauthenticated,
    /// Valid session, but the role may not perform the action.
    Forbidden,
    /// Request failed validation.
    BadRequest,
    /// Unique constraint hit (e.g. email already registered).
    Conflict,
    /// Referenced entity does not exist.
    NotFound,
    /// Unexpected server fault.
    Internal,
}

/// Body of every non-2xx JSON response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message, safe to show to the user.
    pub message: String,
    /// Failure class.
    pub error_type: ErrorType,
}

impl ErrorBody {
    /// Build an error body.
    #[must_use]
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error_type,
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// `POST /api/v1/auth/login` body.
///
/// Both fields are optional on the wire so that an absent field is reported
/// as a classified `invalidCredentials` failure instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// `POST /api/v1/auth/register` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// User data that may leave the server. Never contains the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

/// Successful registration or profile update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
}

/// Route-access check result (`user-auth` / `admin-auth`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessResponse {
    pub ok: bool,
}

/// `POST /api/v1/auth/update-details` body. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailsRequest {
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub new_email: Option<String>,
    #[serde(default)]
    pub new_phone: Option<String>,
}

// =============================================================================
// Wishlist
// =============================================================================

/// Requested wishlist mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistAction {
    Add,
    Remove,
}

impl WishlistAction {
    /// The action that undoes this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Add => Self::Remove,
            Self::Remove => Self::Add,
        }
    }
}

/// `POST /api/v1/user/update-wishlist` body.
///
/// When `type` is omitted the server toggles membership atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistUpdateRequest {
    pub product_id: ProductId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<WishlistAction>,
}

/// Result of a wishlist mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistUpdateResponse {
    pub success: bool,
    pub message: String,
    pub product_id: ProductId,
    pub in_wishlist: bool,
}

/// `GET /api/v1/user/wishlist` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    pub success: bool,
    pub wishlist_items: Vec<ProductId>,
}
