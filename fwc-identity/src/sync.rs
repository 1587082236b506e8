//! Role synchronisation with the identity provider
//!
//! When a user is created or its roles change, the provider's copy of the
//! roles is replaced so tokens it issues carry the same roles.

use async_trait::async_trait;
use serde_json::json;
use url::Url;

use fwc_rbac::Role;

use crate::error::{IdentityError, IdentityResult};
use crate::user::{role_names, UserRecord};

/// Push target for role changes
#[async_trait]
pub trait RoleSync: Send + Sync {
    /// Replace the roles held by a provider user
    async fn push_roles(&self, provider_user_id: &str, roles: &[Role]) -> IdentityResult<()>;
}

/// Provider user-metadata API client
#[derive(Debug, Clone)]
pub struct NeonRoleSync {
    client: reqwest::Client,
    base_url: Url,
    secret: String,
}

impl NeonRoleSync {
    pub fn new(base_url: Url, secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            secret: secret.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn user_url(&self, provider_user_id: &str) -> IdentityResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IdentityError::InvalidConfig {
                message: format!("identity provider URL cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .push("users")
            .push(provider_user_id);
        Ok(url)
    }
}

#[async_trait]
impl RoleSync for NeonRoleSync {
    async fn push_roles(&self, provider_user_id: &str, roles: &[Role]) -> IdentityResult<()> {
        let url = self.user_url(provider_user_id)?;
        let body = json!({ "metadata": { "roles": role_names(roles) } });

        let response = self
            .client
            .patch(url)
            .bearer_auth(&self.secret)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(IdentityError::role_sync(format!("{status}: {detail}")));
        }

        tracing::debug!(provider_user_id, roles = ?roles, "Roles pushed to identity provider");
        Ok(())
    }
}

/// Sync target used when no provider credentials are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRoleSync;

#[async_trait]
impl RoleSync for DisabledRoleSync {
    async fn push_roles(&self, provider_user_id: &str, _roles: &[Role]) -> IdentityResult<()> {
        tracing::debug!(provider_user_id, "Role sync disabled; skipping");
        Ok(())
    }
}

/// True if a push is due: on creation, or when the role list differs
pub fn roles_changed(previous: Option<&[String]>, current: &[String], created: bool) -> bool {
    created || previous != Some(current)
}

/// Push a user's roles if they changed
///
/// Users without a provider id are skipped with a warning.
pub async fn sync_user_roles(
    sync: &dyn RoleSync,
    user: &UserRecord,
    previous: Option<&UserRecord>,
    created: bool,
) -> IdentityResult<()> {
    let previous_roles = previous.map(|user| user.roles.as_slice());
    if !roles_changed(previous_roles, &user.roles, created) {
        return Ok(());
    }

    let Some(provider_user_id) = user.neon_user_id.as_deref() else {
        tracing::warn!(user_id = %user.id, "User has no identity provider id; skipping role sync");
        return Ok(());
    };

    sync.push_roles(provider_user_id, &user.registered_roles()).await
}
