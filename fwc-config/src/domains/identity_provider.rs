//! Identity-provider role sync settings

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;
use crate::validation::{validate_url, Validatable};

/// Role sync is enabled only when both values are present
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl IdentityProviderConfig {
    /// Base URL and secret when role sync is configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.base_url.as_deref(), self.secret.as_deref()) {
            (Some(url), Some(secret)) if !secret.is_empty() => Some((url, secret)),
            _ => None,
        }
    }
}

impl Validatable for IdentityProviderConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(url) = &self.base_url {
            validate_url(url, "base_url", self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "identity_provider"
    }
}
