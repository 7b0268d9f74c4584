//! Declarative permission table.
//!
//! Every role-gated operation is an [`Action`]. Which roles may perform it is
//! declared once in [`Action::allowed_roles`]; the server's authorization gate
//! and the client both consult this table instead of comparing roles inline.
//!
//! | Action                 | customer | admin |
//! |------------------------|----------|-------|
//! | `AccessUserDashboard`  | allow    | deny  |
//! | `AccessAdminDashboard` | deny     | allow |
//! | `UpdateProfile`        | allow    | allow |
//! | `ViewWishlist`         | allow    | deny  |
//! | `UpdateWishlist`       | allow    | deny  |

use serde::{Deserialize, Serialize};

use super::role::Role;

/// A role-gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Enter the shopper dashboard.
    AccessUserDashboard,
    /// Enter the admin dashboard.
    AccessAdminDashboard,
    /// Change one's own name, email or phone.
    UpdateProfile,
    /// Read one's own wishlist.
    ViewWishlist,
    /// Add or remove a wishlist entry.
    UpdateWishlist,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::AccessUserDashboard,
        Self::AccessAdminDashboard,
        Self::UpdateProfile,
        Self::ViewWishlist,
        Self::UpdateWishlist,
    ];

    /// Roles permitted to perform this action.
    #[must_use]
    pub const fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::AccessUserDashboard | Self::ViewWishlist | Self::UpdateWishlist => {
                &[Role::Customer]
            }
            Self::AccessAdminDashboard => &[Role::Admin],
            Self::UpdateProfile => &[Role::Customer, Role::Admin],
        }
    }

    /// Whether `role` may perform this action.
    #[must_use]
    pub fn permits(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    /// User-facing explanation shown when the action is refused for a role.
    #[must_use]
    pub const fn denial_message(self) -> &'static str {
        match self {
            Self::AccessUserDashboard => "This area is for customers only",
            Self::AccessAdminDashboard => "This area is for administrators only",
            Self::UpdateProfile => "You are not allowed to update this profile",
            Self::ViewWishlist => "Admins do not have a wishlist",
            Self::UpdateWishlist => "Admins are not allowed to add items to the wishlist",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AccessUserDashboard => "access_user_dashboard",
            Self::AccessAdminDashboard => "access_admin_dashboard",
            Self::UpdateProfile => "update_profile",
            Self::ViewWishlist => "view_wishlist",
            Self::UpdateWishlist => "update_wishlist",
        };
        f.write_str(name)
    }
}
