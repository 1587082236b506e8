//! Request identity and record identifiers
//!
//! Identities arrive from the session layer as loosely shaped records:
//! role lists of unvalidated strings and a profile reference that may be a
//! bare id or an expanded object. [`Identity::normalize`] turns such a
//! [`RawIdentity`] into a validated value once, at the request boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::roles::Role;

/// Canonical record identifier
///
/// Document stores hand out both numeric and string ids; both collapse to
/// the string form so comparisons never depend on the representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "WireId", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Create from string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Try to parse as integer (for database IDs)
    pub fn as_i32(&self) -> Option<i32> {
        self.0.parse().ok()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Text(String),
}

impl From<WireId> for RecordId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Int(n) => RecordId::from(n),
            WireId::Text(s) => RecordId(s),
        }
    }
}

/// Reference to another record: either its id or the populated record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationRef {
    Id(RecordId),
    Expanded(ExpandedRef),
}

/// Populated relation; only the id is retained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedRef {
    pub id: RecordId,
}

impl RelationRef {
    /// Identifier of the referenced record, whatever the representation
    pub fn id(&self) -> &RecordId {
        match self {
            RelationRef::Id(id) => id,
            RelationRef::Expanded(expanded) => &expanded.id,
        }
    }

    pub fn into_id(self) -> RecordId {
        match self {
            RelationRef::Id(id) => id,
            RelationRef::Expanded(expanded) => expanded.id,
        }
    }
}

/// Identity as delivered by the session layer, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIdentity {
    pub id: RecordId,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub profile: Option<RelationRef>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticated subject of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    id: RecordId,
    roles: BTreeSet<Role>,
    profile: Option<RecordId>,
    email: Option<String>,
}

impl Identity {
    /// Create an identity with no roles and no linked profile
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            roles: BTreeSet::new(),
            profile: None,
            email: None,
        }
    }

    /// Validate a raw identity
    ///
    /// Role strings outside the registry are dropped and the profile
    /// reference is collapsed to its id.
    pub fn normalize(raw: RawIdentity) -> Self {
        let mut roles = BTreeSet::new();
        for name in &raw.roles {
            match name.parse::<Role>() {
                Ok(role) => {
                    roles.insert(role);
                }
                Err(_) => {
                    tracing::warn!(user_id = %raw.id, role = %name, "Dropping unregistered role");
                }
            }
        }

        Self {
            id: raw.id,
            roles,
            profile: raw.profile.map(RelationRef::into_id),
            email: raw.email,
        }
    }

    /// Add a role
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    /// Add several roles
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }

    /// Link a profile
    pub fn with_profile(mut self, profile: impl Into<RecordId>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Directly embedded profile id, if the session carried one
    pub fn profile(&self) -> Option<&RecordId> {
        self.profile.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Most privileged role held, if any
    pub fn highest_role(&self) -> Option<Role> {
        self.roles.iter().next().copied()
    }

    /// See [`crate::predicates::has_any_role`]
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        crate::predicates::has_any_role(self, roles)
    }

    /// See [`crate::predicates::has_role_at_least`]
    pub fn has_role_at_least(&self, minimum: Role) -> bool {
        crate::predicates::has_role_at_least(self, minimum)
    }
}
