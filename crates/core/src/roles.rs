//! Well-known role name constants carried in access-token claims.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Every role the API accepts in a token.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_USER];

/// Whether `role` is one of [`VALID_ROLES`].
pub fn is_known_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_accepted() {
        assert!(is_known_role("admin"));
        assert!(is_known_role("user"));
    }

    #[test]
    fn role_match_is_case_sensitive() {
        assert!(!is_known_role("ADMIN"));
        assert!(!is_known_role(""));
    }
}
