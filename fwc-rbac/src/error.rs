//! Error types for RBAC operations

use thiserror::Error;

/// Result type for RBAC operations
pub type RbacResult<T> = Result<T, RbacError>;

/// RBAC-specific errors
///
/// A denied request is not an error: it is reported through
/// [`AccessDecision::Deny`](crate::decision::AccessDecision::Deny).
#[derive(Error, Debug)]
pub enum RbacError {
    /// Role name outside the registered role set
    #[error("Unknown role: {role}")]
    UnknownRole { role: String },

    /// Resource slug that has no registered policy
    #[error("Unknown resource type: {slug}")]
    UnknownResource { slug: String },

    /// The profile store could not answer a lookup
    #[error("Profile resolution failed for user {user_id}: {message}")]
    ProfileResolution { user_id: String, message: String },

    /// Invalid policy configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RbacError {
    /// Create a new unknown role error
    pub fn unknown_role(role: impl Into<String>) -> Self {
        Self::UnknownRole { role: role.into() }
    }

    /// Create a new profile resolution error
    pub fn profile_resolution(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProfileResolution {
            user_id: user_id.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check whether the decision could not be determined because a dependency failed
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ProfileResolution { .. })
    }

    /// Check whether this error points at a configuration or programming mistake
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownRole { .. } | Self::UnknownResource { .. } | Self::InvalidConfig { .. }
        )
    }
}

/// Error reported by a [`ProfileStore`](crate::profile::ProfileStore) implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Profile store unavailable: {message}")]
pub struct ProfileStoreError {
    pub message: String,
}

impl ProfileStoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = RbacError::profile_resolution("7", "connection refused");
        assert!(err.is_unavailable());
        assert!(!err.is_programmer_error());

        let err = RbacError::unknown_role("bishop");
        assert!(err.is_programmer_error());
        assert!(!err.is_unavailable());
        assert_eq!(err.to_string(), "Unknown role: bishop");
    }
}
