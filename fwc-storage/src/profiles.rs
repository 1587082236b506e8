//! SeaORM profile store

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::{Map, Value};

use fwc_rbac::{Document, ProfileRecord, ProfileStore, ProfileStoreError, RecordId};

use crate::entities::{profiles, Profiles};
use crate::error::{StorageError, StorageResult};

/// Profile columns stored outside the `data` object, by document field name
const COLUMN_FIELDS: [&str; 4] = ["user", "displayName", "slug", "bio"];

/// Profile persistence backed by SeaORM
#[derive(Clone)]
pub struct SeaOrmProfileStore {
    db: DatabaseConnection,
}

impl SeaOrmProfileStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a profile from a document; returns the stored document
    pub async fn create(&self, doc: &Document) -> StorageResult<Document> {
        let mut model = profiles::ActiveModel {
            data: Set(Value::Object(Map::new())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        apply_fields(&mut model, doc, Map::new())?;

        let stored = model.insert(&self.db).await?;
        Ok(to_document(stored))
    }

    /// Profile as a document, `None` when unknown
    pub async fn find_document(&self, id: &RecordId) -> StorageResult<Option<Document>> {
        let Some(id) = id.as_i32() else {
            return Ok(None);
        };
        let model = Profiles::find_by_id(id).one(&self.db).await?;
        Ok(model.map(to_document))
    }

    /// Merge `patch` into a profile; returns the updated document
    pub async fn apply_patch(&self, id: &RecordId, patch: &Document) -> StorageResult<Option<Document>> {
        let Some(id) = id.as_i32() else {
            return Ok(None);
        };
        let Some(existing) = Profiles::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let data = match &existing.data {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        let mut model: profiles::ActiveModel = existing.into();
        apply_fields(&mut model, patch, data)?;
        model.updated_at = Set(Utc::now());

        let updated = model.update(&self.db).await?;
        tracing::debug!(profile_id = id, "Profile updated");
        Ok(Some(to_document(updated)))
    }
}

fn apply_fields(
    model: &mut profiles::ActiveModel,
    doc: &Document,
    mut data: Map<String, Value>,
) -> StorageResult<()> {
    let Value::Object(fields) = doc.as_value() else {
        return Err(StorageError::invalid_record("profile data must be an object"));
    };

    for (name, value) in fields {
        match name.as_str() {
            "id" => {}
            "user" => model.user_id = Set(relation_id(value)?),
            "displayName" => model.display_name = Set(optional_string(name, value)?),
            "slug" => model.slug = Set(optional_string(name, value)?),
            "bio" => model.bio = Set(optional_string(name, value)?),
            _ => {
                data.insert(name.clone(), value.clone());
            }
        }
    }

    model.data = Set(Value::Object(data));
    Ok(())
}

fn optional_string(field: &str, value: &Value) -> StorageResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(StorageError::invalid_record(format!("{field} must be a string"))),
    }
}

/// Relation value as a numeric id: bare number, numeric string or `{id}` object
fn relation_id(value: &Value) -> StorageResult<Option<i32>> {
    let invalid = || StorageError::invalid_record(format!("invalid relation id: {value}"));
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Some)
            .ok_or_else(invalid),
        Value::String(s) => s.parse().map(Some).map_err(|_| invalid()),
        Value::Object(map) => map.get("id").map_or(Ok(None), relation_id),
        _ => Err(invalid()),
    }
}

fn to_document(model: profiles::Model) -> Document {
    let mut fields = match model.data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for name in COLUMN_FIELDS {
        fields.remove(name);
    }

    fields.insert("id".into(), Value::from(model.id));
    fields.insert("user".into(), model.user_id.map_or(Value::Null, Value::from));
    fields.insert("displayName".into(), model.display_name.map_or(Value::Null, Value::from));
    fields.insert("slug".into(), model.slug.map_or(Value::Null, Value::from));
    fields.insert("bio".into(), model.bio.map_or(Value::Null, Value::from));
    Document::new(Value::Object(fields))
}

fn to_record(model: profiles::Model) -> ProfileRecord {
    ProfileRecord {
        id: RecordId::from(model.id),
        user: model.user_id.map(RecordId::from),
    }
}

#[async_trait]
impl ProfileStore for SeaOrmProfileStore {
    async fn find_first_by_user(
        &self,
        user_id: &RecordId,
    ) -> Result<Option<ProfileRecord>, ProfileStoreError> {
        let Some(user_id) = user_id.as_i32() else {
            return Ok(None);
        };

        let model = Profiles::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .order_by_asc(profiles::Column::Id)
            .one(&self.db)
            .await
            .map_err(StorageError::from)?;
        Ok(model.map(to_record))
    }

    async fn find_by_id(&self, id: &RecordId) -> Result<Option<ProfileRecord>, ProfileStoreError> {
        let Some(id) = id.as_i32() else {
            return Ok(None);
        };

        let model = Profiles::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::from)?;
        Ok(model.map(to_record))
    }
}
