//! Identity-provider bridge for FWC
//!
//! Maps externally authenticated callers onto local user records and
//! keeps the provider's copy of each user's roles in step.

pub mod error;
pub mod handlers;
pub mod provisioning;
pub mod store;
pub mod sync;
pub mod user;

pub use error::{IdentityError, IdentityResult};
pub use handlers::{routes, IdentityState};
pub use provisioning::UserProvisioner;
pub use store::UserStore;
pub use sync::{DisabledRoleSync, NeonRoleSync, RoleSync};
pub use user::{NewUser, UserRecord, UserSummary};
