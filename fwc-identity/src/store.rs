//! User persistence seam

use async_trait::async_trait;

use fwc_rbac::{RecordId, Role};

use crate::error::IdentityResult;
use crate::user::{NewUser, UserRecord};

/// Storage of local user records
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_auth0_id(&self, auth0_id: &str) -> IdentityResult<Option<UserRecord>>;

    async fn find_by_id(&self, id: &RecordId) -> IdentityResult<Option<UserRecord>>;

    async fn create(&self, user: NewUser) -> IdentityResult<UserRecord>;

    /// Replace a user's roles; `None` if the user does not exist
    async fn update_roles(&self, id: &RecordId, roles: &[Role]) -> IdentityResult<Option<UserRecord>>;
}
