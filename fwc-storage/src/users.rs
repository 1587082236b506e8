//! SeaORM user store

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde_json::Value;

use fwc_identity::user::role_names;
use fwc_identity::{IdentityResult, NewUser, UserRecord, UserStore};
use fwc_rbac::{RecordId, Role};

use crate::entities::{users, Users};
use crate::error::{StorageError, StorageResult};

/// User persistence backed by SeaORM
#[derive(Clone)]
pub struct SeaOrmUserStore {
    db: DatabaseConnection,
}

impl SeaOrmUserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Point a user at its profile
    pub async fn set_profile(&self, id: &RecordId, profile: Option<&RecordId>) -> StorageResult<()> {
        let id = numeric(id)?;
        let profile_id = profile.map(numeric).transpose()?;

        users::ActiveModel {
            id: Set(id),
            profile_id: Set(profile_id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }
}

fn numeric(id: &RecordId) -> StorageResult<i32> {
    id.as_i32()
        .ok_or_else(|| StorageError::invalid_record(format!("non-numeric user id: {id}")))
}

fn to_record(model: users::Model) -> StorageResult<UserRecord> {
    let roles: Vec<String> = match model.roles {
        Value::Null => Vec::new(),
        roles => serde_json::from_value(roles)?,
    };

    Ok(UserRecord {
        id: RecordId::from(model.id),
        email: model.email,
        auth0_id: model.auth0_id,
        neon_user_id: model.neon_user_id,
        roles,
        profile: model.profile_id.map(RecordId::from),
    })
}

fn roles_json(roles: &[Role]) -> Value {
    Value::from(role_names(roles))
}

#[async_trait]
impl UserStore for SeaOrmUserStore {
    async fn find_by_auth0_id(&self, auth0_id: &str) -> IdentityResult<Option<UserRecord>> {
        let model = Users::find()
            .filter(users::Column::Auth0Id.eq(auth0_id))
            .one(&self.db)
            .await
            .map_err(StorageError::from)?;
        Ok(model.map(to_record).transpose()?)
    }

    async fn find_by_id(&self, id: &RecordId) -> IdentityResult<Option<UserRecord>> {
        let Some(id) = id.as_i32() else {
            return Ok(None);
        };
        let model = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::from)?;
        Ok(model.map(to_record).transpose()?)
    }

    async fn create(&self, user: NewUser) -> IdentityResult<UserRecord> {
        let now = Utc::now();
        let model = users::ActiveModel {
            email: Set(user.email),
            auth0_id: Set(user.auth0_id),
            neon_user_id: Set(user.neon_user_id),
            roles: Set(roles_json(&user.roles)),
            profile_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(StorageError::from)?;

        Ok(to_record(model)?)
    }

    async fn update_roles(&self, id: &RecordId, roles: &[Role]) -> IdentityResult<Option<UserRecord>> {
        let Some(id) = id.as_i32() else {
            return Ok(None);
        };
        let Some(existing) = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::from)?
        else {
            return Ok(None);
        };

        let mut model: users::ActiveModel = existing.into();
        model.roles = Set(roles_json(roles));
        model.updated_at = Set(Utc::now());
        let updated = model.update(&self.db).await.map_err(StorageError::from)?;

        tracing::info!(user_id = id, roles = ?roles, "User roles updated");
        Ok(Some(to_record(updated)?))
    }
}
