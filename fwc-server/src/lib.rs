//! FWC server
//!
//! Serves the identity bridge and the internal profile-update endpoint,
//! with every request classified by route before access decisions.

pub mod error;
pub mod handlers;
pub mod services;
pub mod startup;

pub use error::{ApiError, ApiResult};
pub use services::ServiceContainer;
pub use startup::Server;
