//! Domain-split configuration for FWC services
//!
//! Each functional domain owns its section, its defaults and its
//! validation. Values come from YAML with `FWC_*` environment overrides.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

pub use domains::{
    auth::AuthConfig,
    database::DatabaseConfig,
    identity_provider::IdentityProviderConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    server::ServerConfig,
    FwcConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;
