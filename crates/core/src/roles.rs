//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in the initial
//! migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_STUDENT: &str = "student";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_INSTRUCTOR, ROLE_STUDENT];

/// Whether `role` may author courses and host workshops.
pub fn can_teach(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_INSTRUCTOR
}

/// Whether `role` is valid.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_and_instructors_teach() {
        assert!(can_teach(ROLE_ADMIN));
        assert!(can_teach(ROLE_INSTRUCTOR));
        assert!(!can_teach(ROLE_STUDENT));
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(validate_role("chef").is_err());
        assert!(validate_role(ROLE_STUDENT).is_ok());
    }
}
