//! Configuration for the access engine

use serde::{Deserialize, Serialize};

use crate::decision::RouteContext;
use crate::error::{RbacError, RbacResult};

/// Access engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    /// Path segment identifying the administrative surface
    pub admin_path_segment: String,

    /// Log every decision at `info` on the `fwc_rbac::audit` target
    pub enable_audit_logging: bool,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            admin_path_segment: "/admin".to_string(),
            enable_audit_logging: false,
        }
    }
}

impl RbacConfig {
    /// Classify an inbound request path
    pub fn route_for(&self, path: &str) -> RouteContext {
        RouteContext::from_path(path, &self.admin_path_segment)
    }

    pub fn validate(&self) -> RbacResult<()> {
        if !self.admin_path_segment.starts_with('/') || self.admin_path_segment.len() < 2 {
            return Err(RbacError::invalid_config(format!(
                "admin path segment must look like '/admin', got '{}'",
                self.admin_path_segment
            )));
        }
        Ok(())
    }
}
