//! Role predicates
//!
//! Pure functions over an identity's role set. They never fail for a
//! well-typed [`Role`]; only the name-based variant can report an unknown
//! role, which is a configuration mistake rather than a denial.

use crate::error::RbacResult;
use crate::identity::Identity;
use crate::roles::Role;

/// True if the identity holds at least one of `roles`
pub fn has_any_role(identity: &Identity, roles: &[Role]) -> bool {
    roles.iter().any(|role| identity.roles().contains(role))
}

/// True if any held role ranks at or above `minimum`
///
/// An identity without roles never satisfies this.
pub fn has_role_at_least(identity: &Identity, minimum: Role) -> bool {
    identity
        .roles()
        .iter()
        .any(|role| role.outranks_or_equals(minimum))
}

/// Name-based form of [`has_role_at_least`]
pub fn has_role_at_least_named(identity: &Identity, minimum: &str) -> RbacResult<bool> {
    let minimum: Role = minimum.parse()?;
    Ok(has_role_at_least(identity, minimum))
}

/// Optional-identity form used by the evaluators: anonymous callers hold no roles
pub(crate) fn holds_role_at_least(identity: Option<&Identity>, minimum: Role) -> bool {
    identity.is_some_and(|identity| has_role_at_least(identity, minimum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RbacError;

    #[test]
    fn test_has_any_role() {
        let user = Identity::new(1).with_roles([Role::Student, Role::Volunteer]);
        assert!(has_any_role(&user, &[Role::Admin, Role::Volunteer]));
        assert!(!has_any_role(&user, &[Role::Admin, Role::Pastor]));
        assert!(!has_any_role(&user, &[]));
    }

    #[test]
    fn test_has_role_at_least() {
        let mentor = Identity::new(2).with_role(Role::Mentor);
        assert!(has_role_at_least(&mentor, Role::Mentor));
        assert!(has_role_at_least(&mentor, Role::Member));
        assert!(!has_role_at_least(&mentor, Role::Leader));
    }

    #[test]
    fn test_best_role_wins() {
        let user = Identity::new(3).with_roles([Role::Viewer, Role::Pastor]);
        assert!(has_role_at_least(&user, Role::Pastor));
        assert!(!has_role_at_least(&user, Role::Admin));
    }

    #[test]
    fn test_empty_role_set_never_qualifies() {
        let nobody = Identity::new(4);
        assert!(!has_role_at_least(&nobody, Role::Viewer));
        assert!(!holds_role_at_least(None, Role::Viewer));
    }

    #[test]
    fn test_named_minimum() {
        let staff = Identity::new(5).with_role(Role::Staff);
        assert!(has_role_at_least_named(&staff, "volunteer").unwrap());
        assert!(!has_role_at_least_named(&staff, "mentor").unwrap());
        assert!(matches!(
            has_role_at_least_named(&staff, "deacon"),
            Err(RbacError::UnknownRole { .. })
        ));
    }
}
