//! Local user records

use serde::{Deserialize, Serialize};

use fwc_rbac::{Identity, RawIdentity, RecordId, RelationRef, Role};

/// User record as stored locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: RecordId,
    pub email: String,
    #[serde(default)]
    pub auth0_id: Option<String>,
    #[serde(default)]
    pub neon_user_id: Option<String>,
    /// Role names as stored; may contain values outside the registry
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub profile: Option<RecordId>,
}

impl UserRecord {
    /// Validated identity for access decisions
    pub fn to_identity(&self) -> Identity {
        Identity::normalize(RawIdentity {
            id: self.id.clone(),
            roles: self.roles.clone(),
            profile: self.profile.clone().map(RelationRef::Id),
            email: Some(self.email.clone()),
        })
    }

    /// Registered roles held, in stored order
    pub fn registered_roles(&self) -> Vec<Role> {
        normalize_role_names(&self.roles)
    }

    /// Response body shared by the bridge endpoints
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
            profile: self.profile.clone(),
        }
    }
}

/// Public projection of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: RecordId,
    pub email: String,
    pub roles: Vec<String>,
    pub profile: Option<RecordId>,
}

/// Fields of a user to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub auth0_id: Option<String>,
    pub neon_user_id: Option<String>,
    pub roles: Vec<Role>,
}

/// Lower-case and trim an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Lower-case role names, drop unregistered ones and duplicates
pub fn normalize_role_names(names: &[String]) -> Vec<Role> {
    let mut roles = Vec::new();
    for name in names {
        if let Ok(role) = name.to_lowercase().parse::<Role>() {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
    }
    roles
}

/// Role names for storage
pub fn role_names(roles: &[Role]) -> Vec<String> {
    roles.iter().map(|role| role.as_str().to_string()).collect()
}
