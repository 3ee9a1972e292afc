//! User roles as an ordered hierarchy.

use serde::{Deserialize, Serialize};

/// Fixed role hierarchy: `Member < Manager < Admin`.
///
/// The discriminant order drives the derived `Ord`, so rank comparisons
/// are plain `<`/`>=` on the enum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Regular agency member.
    Member,
    /// Manager: may also delete listings and feedbacks.
    Manager,
    /// Administrator: full privilege, including user management.
    Admin,
}

impl Role {
    /// Wire representation stored in the database and in token claims.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Manager => "Manager",
            Self::Admin => "Admin",
        }
    }

    /// Parses a stored role string. Unknown strings map to `Member`,
    /// the lowest rank.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "Admin" => Self::Admin,
            "Manager" => Self::Manager,
            _ => Self::Member,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a requested role change against the target's current role.
///
/// The new role is applied only when it is a strict demotion, or the
/// caller is an Admin. Anything else keeps the current role — the
/// request is silently dropped, not rejected.
#[must_use]
pub fn resolve_role_change(current: Role, requested: Role, caller_is_admin: bool) -> Role {
    if requested < current || caller_is_admin {
        requested
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_is_totally_ordered() {
        assert!(Role::Member < Role::Manager);
        assert!(Role::Manager < Role::Admin);
    }

    #[test]
    fn admin_may_escalate() {
        assert_eq!(
            resolve_role_change(Role::Member, Role::Manager, true),
            Role::Manager
        );
        assert_eq!(
            resolve_role_change(Role::Manager, Role::Admin, true),
            Role::Admin
        );
    }

    #[test]
    fn non_admin_escalation_is_silently_dropped() {
        assert_eq!(
            resolve_role_change(Role::Member, Role::Admin, false),
            Role::Member
        );
        assert_eq!(
            resolve_role_change(Role::Manager, Role::Admin, false),
            Role::Manager
        );
    }

    #[test]
    fn demotion_is_allowed_without_admin() {
        assert_eq!(
            resolve_role_change(Role::Manager, Role::Member, false),
            Role::Member
        );
    }

    #[test]
    fn unknown_role_string_parses_as_member() {
        assert_eq!(Role::parse("Superuser"), Role::Member);
        assert_eq!(Role::parse("Admin"), Role::Admin);
    }
}
