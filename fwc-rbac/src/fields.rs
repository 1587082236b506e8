//! Field-level access overrides
//!
//! Field policies narrow what a permitted write may touch. They are only
//! consulted after the document-level decision allowed the write.

use std::collections::BTreeMap;

use crate::roles::Role;

/// Policy attached to one field for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Caller holds `minimum`, or owns the document being written
    SelfOrRole(Role),
    /// Caller holds the role or better
    RoleAtLeast(Role),
    /// Caller holds the role, or the incoming value references the caller's own user
    SelfAssignedOrRole(Role),
}

impl FieldPolicy {
    /// Minimum role that passes regardless of ownership
    pub fn minimum(self) -> Role {
        match self {
            FieldPolicy::SelfOrRole(role)
            | FieldPolicy::RoleAtLeast(role)
            | FieldPolicy::SelfAssignedOrRole(role) => role,
        }
    }
}

pub fn editable_by_self_or_role(minimum: Role) -> FieldPolicy {
    FieldPolicy::SelfOrRole(minimum)
}

pub fn staff_only_field() -> FieldPolicy {
    FieldPolicy::RoleAtLeast(Role::Staff)
}

pub fn admin_only_field() -> FieldPolicy {
    FieldPolicy::RoleAtLeast(Role::Admin)
}

pub fn self_assigned_or_role(minimum: Role) -> FieldPolicy {
    FieldPolicy::SelfAssignedOrRole(minimum)
}

/// Per-action policies of one field; `None` leaves the action unrestricted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldAccess {
    pub create: Option<FieldPolicy>,
    pub update: Option<FieldPolicy>,
}

impl FieldAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same policy on create and update
    pub fn both(policy: FieldPolicy) -> Self {
        Self {
            create: Some(policy),
            update: Some(policy),
        }
    }

    pub fn on_create(mut self, policy: FieldPolicy) -> Self {
        self.create = Some(policy);
        self
    }

    pub fn on_update(mut self, policy: FieldPolicy) -> Self {
        self.update = Some(policy);
        self
    }
}

/// Field policies of a resource type, keyed by top-level field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRules {
    fields: BTreeMap<String, FieldAccess>,
}

impl FieldRules {
    pub fn insert(&mut self, field: impl Into<String>, access: FieldAccess) {
        self.fields.insert(field.into(), access);
    }

    pub fn get(&self, field: &str) -> Option<&FieldAccess> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldAccess)> {
        self.fields.iter().map(|(name, access)| (name.as_str(), access))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_field_policies() {
        assert_eq!(staff_only_field(), FieldPolicy::RoleAtLeast(Role::Staff));
        assert_eq!(admin_only_field().minimum(), Role::Admin);
        assert_eq!(
            self_assigned_or_role(Role::Leader).minimum(),
            Role::Leader
        );
    }

    #[test]
    fn test_rules_lookup() {
        let mut rules = FieldRules::default();
        assert!(rules.is_empty());
        rules.insert(
            "user",
            FieldAccess::new()
                .on_create(self_assigned_or_role(Role::Leader))
                .on_update(FieldPolicy::RoleAtLeast(Role::Leader)),
        );
        rules.insert("bio", FieldAccess::both(editable_by_self_or_role(Role::Staff)));

        let user = rules.get("user").unwrap();
        assert_eq!(user.create, Some(FieldPolicy::SelfAssignedOrRole(Role::Leader)));
        assert_eq!(user.update, Some(FieldPolicy::RoleAtLeast(Role::Leader)));
        assert!(rules.get("title").is_none());
        assert_eq!(rules.iter().map(|(name, _)| name).collect::<Vec<_>>(), vec!["bio", "user"]);
    }
}
