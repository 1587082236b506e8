//! Declarative policy table
//!
//! Each resource type declares one [`Policy`] per action, plus the optional
//! ownership, visibility and field rules those policies refer to. The table
//! is an explicit value built once at start-up and shared by reference.

use std::collections::HashMap;

use crate::error::{RbacError, RbacResult};
use crate::fields::{FieldAccess, FieldPolicy, FieldRules};
use crate::models::{Action, ResourceType};
use crate::roles::Role;
use crate::visibility::VisibilityRule;

/// How a document relates to the caller that owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// The document is the caller's own user record
    UserRecord,
    /// The document is the caller's own profile record
    ProfileRecord,
    /// A relation field pointing at the owning user
    UserField(String),
    /// A relation field pointing at the owning profile
    ProfileField(String),
}

impl Owner {
    pub fn user_field(field: impl Into<String>) -> Self {
        Owner::UserField(field.into())
    }

    pub fn profile_field(field: impl Into<String>) -> Self {
        Owner::ProfileField(field.into())
    }

    /// True if ownership is expressed against the caller's profile
    pub fn needs_profile(&self) -> bool {
        matches!(self, Owner::ProfileRecord | Owner::ProfileField(_))
    }

    /// Field compared against the owner id; `id` for record owners
    pub fn field(&self) -> &str {
        match self {
            Owner::UserRecord | Owner::ProfileRecord => "id",
            Owner::UserField(field) | Owner::ProfileField(field) => field,
        }
    }
}

/// Document-level rule for one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Unconditional; `Constant(true)` also admits anonymous callers
    Constant(bool),
    /// Any authenticated caller
    SignedIn,
    /// Caller holds the role or better
    RoleAtLeast(Role),
    /// Caller holds one of the roles
    AnyRole(Vec<Role>),
    /// Only documents the caller owns, per the resource's [`Owner`]
    OwnerOnly,
    /// Role check first, then ownership
    SelfOrRole(Role),
    /// Delegate to the resource's [`VisibilityRule`]
    Visibility,
}

impl Policy {
    /// True if evaluating the policy consults the resource's owner
    pub fn uses_owner(&self) -> bool {
        matches!(self, Policy::OwnerOnly | Policy::SelfOrRole(_))
    }
}

/// Anyone, signed in or not
pub fn public_read() -> Policy {
    Policy::Constant(true)
}

pub fn nobody() -> Policy {
    Policy::Constant(false)
}

pub fn signed_in() -> Policy {
    Policy::SignedIn
}

pub fn admin_only() -> Policy {
    Policy::RoleAtLeast(Role::Admin)
}

/// admin, pastor, leader, instructor, mentor and staff
pub fn staff_only() -> Policy {
    Policy::RoleAtLeast(Role::Staff)
}

pub fn instructors_only() -> Policy {
    Policy::RoleAtLeast(Role::Instructor)
}

pub fn mentors_only() -> Policy {
    Policy::RoleAtLeast(Role::Mentor)
}

/// Exact role membership, without rank inheritance
pub fn allow_roles(roles: &[Role]) -> Policy {
    Policy::AnyRole(roles.to_vec())
}

/// Course material: students and above
pub fn lms_read() -> Policy {
    Policy::RoleAtLeast(Role::Student)
}

/// Course authoring: instructors and above
pub fn lms_write() -> Policy {
    Policy::RoleAtLeast(Role::Instructor)
}

pub fn self_or_role(minimum: Role) -> Policy {
    Policy::SelfOrRole(minimum)
}

pub fn owner_only() -> Policy {
    Policy::OwnerOnly
}

pub fn visible() -> Policy {
    Policy::Visibility
}

/// Everything a resource type declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePolicy {
    read: Policy,
    create: Policy,
    update: Policy,
    delete: Policy,
    owner: Option<Owner>,
    visibility: Option<VisibilityRule>,
    fields: FieldRules,
}

impl Default for ResourcePolicy {
    /// Every action requires a signed-in caller
    fn default() -> Self {
        Self {
            read: Policy::SignedIn,
            create: Policy::SignedIn,
            update: Policy::SignedIn,
            delete: Policy::SignedIn,
            owner: None,
            visibility: None,
            fields: FieldRules::default(),
        }
    }
}

impl ResourcePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(mut self, policy: Policy) -> Self {
        self.read = policy;
        self
    }

    pub fn create(mut self, policy: Policy) -> Self {
        self.create = policy;
        self
    }

    pub fn update(mut self, policy: Policy) -> Self {
        self.update = policy;
        self
    }

    pub fn delete(mut self, policy: Policy) -> Self {
        self.delete = policy;
        self
    }

    /// Same policy for create, update and delete
    pub fn write(self, policy: Policy) -> Self {
        self.create(policy.clone()).update(policy.clone()).delete(policy)
    }

    pub fn owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn visibility(mut self, rule: VisibilityRule) -> Self {
        self.visibility = Some(rule);
        self
    }

    pub fn field(mut self, name: impl Into<String>, access: FieldAccess) -> Self {
        self.fields.insert(name, access);
        self
    }

    pub fn policy_for(&self, action: Action) -> &Policy {
        match action {
            Action::Read => &self.read,
            Action::Create => &self.create,
            Action::Update => &self.update,
            Action::Delete => &self.delete,
        }
    }

    pub fn owner_rule(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    pub fn visibility_rule(&self) -> Option<&VisibilityRule> {
        self.visibility.as_ref()
    }

    pub fn field_rules(&self) -> &FieldRules {
        &self.fields
    }

    /// Check that every rule a policy refers to is declared
    pub fn validate(&self, resource: ResourceType) -> RbacResult<()> {
        for action in Action::ALL {
            let policy = self.policy_for(action);
            if policy.uses_owner() && self.owner.is_none() {
                return Err(RbacError::invalid_config(format!(
                    "{resource}: {action} policy needs an owner"
                )));
            }
            if *policy == Policy::Visibility && self.visibility.is_none() {
                return Err(RbacError::invalid_config(format!(
                    "{resource}: {action} policy needs a visibility rule"
                )));
            }
        }

        let self_fields = self.fields.iter().any(|(_, access)| {
            [access.create, access.update]
                .iter()
                .any(|policy| matches!(policy, Some(FieldPolicy::SelfOrRole(_))))
        });
        if self_fields && self.owner.is_none() {
            return Err(RbacError::invalid_config(format!(
                "{resource}: self-editable fields need an owner"
            )));
        }

        if let Some(rule) = &self.visibility {
            rule.validate()?;
        }

        Ok(())
    }
}

/// Policies of every registered resource type
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    entries: HashMap<ResourceType, ResourcePolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a resource type's policy
    pub fn insert(&mut self, resource: ResourceType, policy: ResourcePolicy) {
        self.entries.insert(resource, policy);
    }

    pub fn with(mut self, resource: ResourceType, policy: ResourcePolicy) -> Self {
        self.insert(resource, policy);
        self
    }

    pub fn get(&self, resource: ResourceType) -> RbacResult<&ResourcePolicy> {
        self.entries
            .get(&resource)
            .ok_or_else(|| RbacError::UnknownResource {
                slug: resource.slug().to_string(),
            })
    }

    /// Look up by collection slug
    pub fn get_by_slug(&self, slug: &str) -> RbacResult<(ResourceType, &ResourcePolicy)> {
        let resource: ResourceType = slug.parse()?;
        Ok((resource, self.get(resource)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resources(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.entries.keys().copied()
    }

    pub fn validate(&self) -> RbacResult<()> {
        for (resource, policy) in &self.entries {
            policy.validate(*resource)?;
        }
        Ok(())
    }
}
