//! Shared secrets and access-control settings

use fwc_rbac::{RbacConfig, Role};
use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret shared with the sign-in front end; bridge calls fail when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_secret: Option<String>,

    /// Key accepted as `users API-Key <key>` on internal profile updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Path segment marking administrative routes
    pub admin_path_segment: String,

    /// Role given to users created on first sign-in
    pub default_role: String,

    /// Log every access decision on the audit target
    pub audit_logging: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            internal_secret: None,
            api_key: None,
            admin_path_segment: "/admin".to_string(),
            default_role: Role::Viewer.as_str().to_string(),
            audit_logging: false,
        }
    }
}

impl AuthConfig {
    /// The configured default role
    pub fn default_role(&self) -> ConfigResult<Role> {
        self.default_role
            .to_lowercase()
            .parse()
            .map_err(|_| self.validation_error(format!("unknown default_role '{}'", self.default_role)))
    }

    /// Access-engine settings
    pub fn rbac_config(&self) -> RbacConfig {
        RbacConfig {
            admin_path_segment: self.admin_path_segment.clone(),
            enable_audit_logging: self.audit_logging,
        }
    }
}

impl Validatable for AuthConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.default_role()?;
        self.rbac_config()
            .validate()
            .map_err(|e| self.validation_error(e.to_string()))?;

        if let Some(secret) = &self.internal_secret {
            validate_required_string(secret, "internal_secret", self.domain_name())?;
        }
        if let Some(key) = &self.api_key {
            validate_required_string(key, "api_key", self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "auth"
    }
}
