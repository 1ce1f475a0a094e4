//! Row-level access decision shared by every domain.

use uuid::Uuid;

/// Name of the role that bypasses ownership checks.
pub const ADMIN_ROLE: &str = "Admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        self == Access::Allow
    }
}

/// Decide whether the acting user may touch a resource.
///
/// Admins are always allowed. Everyone else is denied on `admin_only`
/// resources, and otherwise allowed only on resources they own. A resource
/// without an owner is never accessible to non-admins.
pub fn can_access(
    acting_user_id: Uuid,
    acting_user_role: Option<&str>,
    resource_owner_id: Option<Uuid>,
    admin_only: bool,
) -> Access {
    if acting_user_role == Some(ADMIN_ROLE) {
        return Access::Allow;
    }

    if admin_only {
        return Access::Deny;
    }

    match resource_owner_id {
        Some(owner) if owner == acting_user_id => Access::Allow,
        _ => Access::Deny,
    }
}
