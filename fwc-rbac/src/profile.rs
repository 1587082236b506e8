//! Profile lookup
//!
//! Ownership checks compare against the caller's Profile id. Sessions may
//! carry it directly; otherwise it is looked up by user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProfileStoreError, RbacError, RbacResult};
use crate::identity::{Identity, RecordId};

/// Minimal projection of a profile record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: RecordId,
    /// Owning user, if linked
    pub user: Option<RecordId>,
}

/// Read access to profile records
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// First profile whose `user` equals `user_id`
    async fn find_first_by_user(
        &self,
        user_id: &RecordId,
    ) -> Result<Option<ProfileRecord>, ProfileStoreError>;

    /// Profile by its own id
    ///
    /// Not used by the engine's checks; callers use it to load a profile
    /// named by an embedded session reference or a request path.
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<ProfileRecord>, ProfileStoreError>;
}

/// Resolve the caller's profile id
///
/// `Ok(None)` means the caller has no profile; a store failure surfaces as
/// [`RbacError::ProfileResolution`] and must not be read as a denial.
pub async fn resolve_profile_id(
    identity: &Identity,
    store: &dyn ProfileStore,
) -> RbacResult<Option<RecordId>> {
    if let Some(profile) = identity.profile() {
        return Ok(Some(profile.clone()));
    }

    match store.find_first_by_user(identity.id()).await {
        Ok(found) => Ok(found.map(|record| record.id)),
        Err(err) => {
            tracing::warn!(user_id = %identity.id(), error = %err, "Profile lookup failed");
            Err(RbacError::profile_resolution(identity.id().as_str(), err.message))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store counting lookups
    #[derive(Default)]
    pub struct MemoryProfileStore {
        pub profiles: Vec<ProfileRecord>,
        pub fail: bool,
        pub lookups: AtomicUsize,
    }

    impl MemoryProfileStore {
        pub fn with(profiles: Vec<(i32, i32)>) -> Self {
            Self {
                profiles: profiles
                    .into_iter()
                    .map(|(id, user)| ProfileRecord {
                        id: id.into(),
                        user: Some(user.into()),
                    })
                    .collect(),
                ..Default::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProfileStore for MemoryProfileStore {
        async fn find_first_by_user(
            &self,
            user_id: &RecordId,
        ) -> Result<Option<ProfileRecord>, ProfileStoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProfileStoreError::new("connection refused"));
            }
            Ok(self
                .profiles
                .iter()
                .find(|p| p.user.as_ref() == Some(user_id))
                .cloned())
        }

        async fn find_by_id(
            &self,
            id: &RecordId,
        ) -> Result<Option<ProfileRecord>, ProfileStoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProfileStoreError::new("connection refused"));
            }
            Ok(self.profiles.iter().find(|p| &p.id == id).cloned())
        }
    }
}
