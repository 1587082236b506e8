//! Domain-specific configuration modules

pub mod auth;
pub mod database;
pub mod identity_provider;
pub mod logging;
pub mod server;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main FWC configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FwcConfig {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub logging: logging::LoggingConfig,
    pub auth: auth::AuthConfig,
    pub identity_provider: identity_provider::IdentityProviderConfig,
}

impl FwcConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.database.validate()?;
        self.logging.validate()?;
        self.auth.validate()?;
        self.identity_provider.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let sample = Self {
            auth: auth::AuthConfig {
                internal_secret: Some("change-me".to_string()),
                api_key: Some("change-me-too".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        serde_yaml::to_string(&sample).unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
