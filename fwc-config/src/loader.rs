//! Configuration loading and environment variable handling

use crate::domains::FwcConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "FWC".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<FwcConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: FwcConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<FwcConfig> {
        let mut config = FwcConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<FwcConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    fn apply_env_overrides(&self, config: &mut FwcConfig) -> ConfigResult<()> {
        if let Some(bind) = self.get_env_var("SERVER_BIND_ADDRESS") {
            config.server.bind_address = bind;
        }
        if let Some(port) = self.get_env_var("SERVER_PORT") {
            config.server.port = parse_env("SERVER_PORT", &port)?;
        }

        if let Some(url) = self.get_env_var("DATABASE_URL") {
            config.database.url = url;
        }

        if let Some(level) = self.get_env_var("LOG_LEVEL") {
            config.logging.level = Some(parse_env("LOG_LEVEL", &level)?);
        }
        if let Some(format) = self.get_env_var("LOG_FORMAT") {
            config.logging.format = parse_env("LOG_FORMAT", &format)?;
        }

        if let Some(secret) = self.get_env_var("INTERNAL_SECRET") {
            config.auth.internal_secret = Some(secret);
        }
        if let Some(key) = self.get_env_var("API_KEY") {
            config.auth.api_key = Some(key);
        }
        if let Some(segment) = self.get_env_var("ADMIN_PATH_SEGMENT") {
            config.auth.admin_path_segment = segment;
        }

        if let Some(url) = self.get_env_var("IDP_BASE_URL") {
            config.identity_provider.base_url = Some(url);
        }
        if let Some(secret) = self.get_env_var("IDP_SECRET") {
            config.identity_provider.secret = Some(secret);
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Option<String> {
        std::env::var(format!("{}_{}", self.prefix, name)).ok()
    }
}

fn parse_env<T>(name: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e)))
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::logging::{LogFormat, LogLevel};
    use std::io::Write;

    const YAML: &str = r#"
server:
  port: 8080
database:
  url: "sqlite::memory:"
  max_connections: 1
auth:
  internal_secret: from-file
  default_role: member
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_with_env_overrides() {
        let file = write_config(YAML);

        temp_env::with_vars(
            [
                ("FWC_INTERNAL_SECRET", Some("from-env")),
                ("FWC_LOG_LEVEL", Some("debug")),
                ("FWC_LOG_FORMAT", Some("json")),
                ("FWC_SERVER_PORT", None),
            ],
            || {
                let config = ConfigLoader::new().from_file(file.path()).unwrap();
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.auth.internal_secret.as_deref(), Some("from-env"));
                assert_eq!(config.auth.default_role, "member");
                assert_eq!(config.logging.level, Some(LogLevel::Debug));
                assert_eq!(config.logging.format, LogFormat::Json);
            },
        );
    }

    #[test]
    fn test_invalid_env_value() {
        temp_env::with_var("FWC_SERVER_PORT", Some("eighty"), || {
            let err = ConfigLoader::new().from_env().unwrap_err();
            assert!(matches!(err, ConfigError::EnvError(_)));
        });
    }

    #[test]
    fn test_invalid_file_values_fail_validation() {
        let file = write_config("auth:\n  default_role: bishop\n");
        temp_env::with_var_unset("FWC_DATABASE_URL", || {
            let err = ConfigLoader::new().from_file(file.path()).unwrap_err();
            assert!(matches!(err, ConfigError::DomainError { ref domain, .. } if domain == "auth"));
        });
    }

    #[test]
    fn test_custom_prefix() {
        temp_env::with_var("CHURCH_IDP_BASE_URL", Some("https://auth.example.org"), || {
            let config = ConfigLoader::with_prefix("CHURCH").from_env().unwrap();
            assert_eq!(
                config.identity_provider.base_url.as_deref(),
                Some("https://auth.example.org")
            );
            assert!(config.identity_provider.credentials().is_none());
        });
    }
}
