//! Role registry
//!
//! The closed set of roles and their ranking. Lower rank means higher
//! authority: `admin` is 0, `viewer` is 9.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RbacError, RbacResult};

/// Authority tag assigned to an identity
///
/// Variants are declared in rank order, so the derived `Ord` agrees with
/// [`Role::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Pastor,
    Leader,
    Instructor,
    Mentor,
    Staff,
    Volunteer,
    Member,
    Student,
    Viewer,
}

/// Every registered role, most privileged first
pub const ROLE_LIST: [Role; 10] = [
    Role::Admin,
    Role::Pastor,
    Role::Leader,
    Role::Instructor,
    Role::Mentor,
    Role::Staff,
    Role::Volunteer,
    Role::Member,
    Role::Student,
    Role::Viewer,
];

impl Role {
    /// Position in the hierarchy (0 = most privileged)
    pub fn rank(self) -> u8 {
        match self {
            Role::Admin => 0,
            Role::Pastor => 1,
            Role::Leader => 2,
            Role::Instructor => 3,
            Role::Mentor => 4,
            Role::Staff => 5,
            Role::Volunteer => 6,
            Role::Member => 7,
            Role::Student => 8,
            Role::Viewer => 9,
        }
    }

    /// Wire name of the role
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pastor => "pastor",
            Role::Leader => "leader",
            Role::Instructor => "instructor",
            Role::Mentor => "mentor",
            Role::Staff => "staff",
            Role::Volunteer => "volunteer",
            Role::Member => "member",
            Role::Student => "student",
            Role::Viewer => "viewer",
        }
    }

    /// True if this role is at least as privileged as `minimum`
    pub fn outranks_or_equals(self, minimum: Role) -> bool {
        self.rank() <= minimum.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ROLE_LIST
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| RbacError::unknown_role(s))
    }
}

/// All registered roles in rank order
pub fn list_roles() -> &'static [Role] {
    &ROLE_LIST
}

/// Rank of a role given by name
pub fn rank_of(role: &str) -> RbacResult<u8> {
    role.parse::<Role>().map(Role::rank)
}
