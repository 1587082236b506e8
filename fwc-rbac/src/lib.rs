//! Ranked-role access control for the FWC content system
//!
//! This crate decides who may read and write which documents:
//! - A fixed ten-level role hierarchy with multi-role identities
//! - Declarative per-collection policies returning allow, deny or a
//!   where-clause filter
//! - Field-level overrides that narrow permitted writes
//! - Visibility rules based on audience tiers and membership relations
//! - Axum glue for route classification and rejection responses

pub mod collections;
pub mod config;
pub mod decision;
pub mod enforcer;
pub mod error;
pub mod fields;
pub mod filter;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod policies;
pub mod predicates;
pub mod profile;
pub mod request;
pub mod roles;
pub mod visibility;

pub use config::RbacConfig;
pub use decision::{AccessDecision, RouteContext, WriteDecision};
pub use enforcer::AccessEngine;
pub use error::{ProfileStoreError, RbacError, RbacResult};
pub use fields::{FieldAccess, FieldPolicy};
pub use filter::Filter;
pub use identity::{Identity, RawIdentity, RecordId, RelationRef};
pub use middleware::AccessRejection;
pub use models::{Action, Document, ResourceType};
pub use policies::{Owner, Policy, PolicyTable, ResourcePolicy};
pub use predicates::{has_any_role, has_role_at_least, has_role_at_least_named};
pub use profile::{ProfileRecord, ProfileStore};
pub use request::AccessRequest;
pub use roles::{list_roles, rank_of, Role};
pub use visibility::VisibilityRule;
