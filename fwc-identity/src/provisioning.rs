//! Just-in-time user provisioning
//!
//! Callers authenticated by the identity provider are mapped onto local
//! user records, creating them on first sight with the default role.

use std::sync::Arc;

use fwc_rbac::{Identity, RecordId, Role};

use crate::error::{IdentityError, IdentityResult};
use crate::store::UserStore;
use crate::sync::{sync_user_roles, RoleSync};
use crate::user::{normalize_email, NewUser, UserRecord};

/// Maps provider accounts onto local users
#[derive(Clone)]
pub struct UserProvisioner {
    store: Arc<dyn UserStore>,
    sync: Arc<dyn RoleSync>,
    default_role: Role,
}

impl UserProvisioner {
    pub fn new(store: Arc<dyn UserStore>, sync: Arc<dyn RoleSync>, default_role: Role) -> Self {
        Self {
            store,
            sync,
            default_role,
        }
    }

    pub fn default_role(&self) -> Role {
        self.default_role
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// Find the user for a provider subject, creating it when unknown
    ///
    /// An email is required only when the user has to be created.
    pub async fn resolve(&self, auth0_id: &str, email: Option<&str>) -> IdentityResult<UserRecord> {
        if auth0_id.is_empty() {
            return Err(IdentityError::missing("auth0Id"));
        }

        if let Some(existing) = self.store.find_by_auth0_id(auth0_id).await? {
            tracing::debug!(user_id = %existing.id, "Resolved existing user");
            return Ok(existing);
        }

        let email = email
            .map(normalize_email)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| IdentityError::missing("email"))?;

        let created = self
            .store
            .create(NewUser {
                email,
                auth0_id: Some(auth0_id.to_string()),
                neon_user_id: None,
                roles: vec![self.default_role],
            })
            .await?;

        tracing::info!(user_id = %created.id, "Provisioned user on first sign-in");
        sync_user_roles(self.sync.as_ref(), &created, None, true).await?;
        Ok(created)
    }

    /// Create a local user for an account of the role-bearing provider
    pub async fn link(&self, neon_user_id: &str, email: &str) -> IdentityResult<UserRecord> {
        if neon_user_id.is_empty() {
            return Err(IdentityError::missing("neonUserId"));
        }
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(IdentityError::missing("email"));
        }

        let created = self
            .store
            .create(NewUser {
                email,
                auth0_id: None,
                neon_user_id: Some(neon_user_id.to_string()),
                roles: vec![self.default_role],
            })
            .await?;

        tracing::info!(user_id = %created.id, neon_user_id, "Linked provider user");
        sync_user_roles(self.sync.as_ref(), &created, None, true).await?;
        Ok(created)
    }

    /// Replace a user's roles and push them if they changed
    ///
    /// Returns `None` when the user does not exist.
    pub async fn assign_roles(
        &self,
        id: &RecordId,
        roles: &[Role],
    ) -> IdentityResult<Option<UserRecord>> {
        let Some(previous) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut deduped: Vec<Role> = Vec::with_capacity(roles.len());
        for role in roles {
            if !deduped.contains(role) {
                deduped.push(*role);
            }
        }

        let Some(updated) = self.store.update_roles(id, &deduped).await? else {
            return Ok(None);
        };

        sync_user_roles(self.sync.as_ref(), &updated, Some(&previous), false).await?;
        Ok(Some(updated))
    }

    /// Identity of a stored user, `None` when unknown
    pub async fn identity_for(&self, id: &RecordId) -> IdentityResult<Option<Identity>> {
        Ok(self
            .store
            .find_by_id(id)
            .await?
            .map(|user| user.to_identity()))
    }
}
