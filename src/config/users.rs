//! Role assignment for newly registered accounts.
//!
//! Administrators are listed by external id in `ADMIN_USER_IDS` (comma separated);
//! `SUPER_ADMIN_USER_ID` names a single super-admin. Everyone else is ordinary.

use crate::entities::account::Role;

/// Resolves a role from explicit admin lists. Whitespace around ids is ignored.
#[must_use]
pub fn role_from_lists(external_id: &str, admin_ids: &str, super_admin_id: Option<&str>) -> Role {
    if super_admin_id.is_some_and(|id| !id.trim().is_empty() && id.trim() == external_id) {
        return Role::SuperAdmin;
    }

    if admin_ids
        .split(',')
        .map(str::trim)
        .any(|id| !id.is_empty() && id == external_id)
    {
        Role::Admin
    } else {
        Role::Ordinary
    }
}

/// Resolves the role for `external_id` from the environment.
#[must_use]
pub fn role_for(external_id: &str) -> Role {
    let admin_ids = std::env::var("ADMIN_USER_IDS").unwrap_or_default();
    let super_admin = std::env::var("SUPER_ADMIN_USER_ID").ok();
    role_from_lists(external_id, &admin_ids, super_admin.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_lists() {
        assert_eq!(role_from_lists("7", "1, 7 ,9", None), Role::Admin);
        assert_eq!(role_from_lists("8", "1,7,9", None), Role::Ordinary);
        assert_eq!(role_from_lists("3", "3", Some("3")), Role::SuperAdmin);
        assert_eq!(role_from_lists("4", "", Some("3")), Role::Ordinary);
    }

    #[test]
    fn test_empty_admin_list_matches_nobody() {
        assert_eq!(role_from_lists("", "", None), Role::Ordinary);
        assert_eq!(role_from_lists("", "1,,2", None), Role::Ordinary);
    }
}
