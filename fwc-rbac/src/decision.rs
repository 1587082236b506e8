//! Access decision outcomes and route context

use serde::Serialize;

use crate::filter::Filter;
use crate::models::Document;

/// Outcome of a document-level access check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "where", rename_all = "snake_case")]
pub enum AccessDecision {
    Deny,
    Allow,
    /// Allowed only for documents matching the filter
    FilteredAllow(Filter),
}

impl AccessDecision {
    pub fn from_bool(allowed: bool) -> Self {
        if allowed {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny
        }
    }

    /// True for `Allow` and `FilteredAllow`
    pub fn is_allowed(&self) -> bool {
        !matches!(self, AccessDecision::Deny)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AccessDecision::Deny)
    }

    pub fn filter(&self) -> Option<&Filter> {
        match self {
            AccessDecision::FilteredAllow(filter) => Some(filter),
            _ => None,
        }
    }

    /// Apply the decision to a fetched document
    pub fn permits(&self, doc: &Document) -> bool {
        match self {
            AccessDecision::Deny => false,
            AccessDecision::Allow => true,
            AccessDecision::FilteredAllow(filter) => filter.matches(doc),
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            AccessDecision::Deny => "deny",
            AccessDecision::Allow => "allow",
            AccessDecision::FilteredAllow(_) => "filtered_allow",
        }
    }
}

/// Outcome of a create or update with its incoming data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteDecision {
    /// The document-level check denied the write
    Deny,
    /// The write may proceed; a filter restricts which target documents it may touch
    Allowed { filter: Option<Filter> },
    /// The whole write is refused because these fields may not be written
    FieldsRejected(Vec<String>),
}

impl WriteDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, WriteDecision::Allowed { .. })
    }
}

/// Where the request entered the system
///
/// Requests arriving through the administrative surface bypass every
/// policy at the engine level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteContext {
    admin: bool,
}

impl RouteContext {
    pub fn admin() -> Self {
        Self { admin: true }
    }

    pub fn public() -> Self {
        Self { admin: false }
    }

    /// Classify a request path: any path containing the admin segment counts
    pub fn from_path(path: &str, admin_segment: &str) -> Self {
        Self {
            admin: !admin_segment.is_empty() && path.contains(admin_segment),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }
}
