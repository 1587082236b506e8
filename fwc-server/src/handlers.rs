//! Server-owned endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use fwc_identity::UserStore;
use fwc_rbac::{
    AccessEngine, AccessRejection, AccessRequest, Action, Document, RecordId, ResourceType,
    RouteContext, WriteDecision,
};
use fwc_storage::SeaOrmProfileStore;

use crate::error::{ApiError, ApiResult};

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// State of the internal profile-update endpoint
#[derive(Clone)]
pub struct ProfileApiState {
    pub engine: AccessEngine,
    pub users: Arc<dyn UserStore>,
    pub profiles: Arc<SeaOrmProfileStore>,
    /// Key expected as `users API-Key <key>`; all calls fail when unset
    pub api_key: Option<Arc<str>>,
}

impl ProfileApiState {
    fn check_api_key(&self, headers: &HeaderMap) -> ApiResult<()> {
        let Some(key) = self.api_key.as_deref() else {
            tracing::warn!(outcome = "denied", "API key not configured; rejecting profile update");
            return Err(ApiError::Unauthorized);
        };

        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("users API-Key "));
        if presented == Some(key) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub profile_id: Option<RecordId>,
    #[serde(default)]
    pub acting_user_id: Option<RecordId>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// `POST /api/internal/update-profile`
///
/// Applies `data` to a profile on behalf of `actingUserId`, subject to the
/// same document and field rules as a direct update by that user.
pub async fn update_profile(
    State(state): State<ProfileApiState>,
    route: RouteContext,
    headers: HeaderMap,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    state.check_api_key(&headers)?;

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable profile update body");
            UpdateProfileRequest::default()
        }
    };
    let (Some(profile_id), Some(acting_user_id)) = (request.profile_id, request.acting_user_id)
    else {
        return Err(ApiError::MissingFields);
    };
    let data = Document::new(request.data.unwrap_or_else(|| json!({})));

    let Some(user) = state.users.find_by_id(&acting_user_id).await? else {
        tracing::debug!(outcome = "denied", user_id = %acting_user_id, "Acting user not found");
        return Err(ApiError::Unauthorized);
    };
    let identity = user.to_identity();

    let Some(profile) = state.profiles.find_document(&profile_id).await? else {
        return Err(ApiError::NotFound("Profile"));
    };

    let access = AccessRequest::new(ResourceType::Profiles, Action::Update)
        .by(&identity)
        .on(&profile)
        .via(route);
    let decision = state.engine.authorize_write(&access, &data).await?;

    if let WriteDecision::Allowed { filter: Some(filter) } = &decision {
        if !filter.matches(&profile) {
            return Err(AccessRejection::Forbidden.into());
        }
    }
    if let Some(rejection) = AccessRejection::for_write(&decision, Some(&identity)) {
        return Err(rejection.into());
    }

    let updated = state
        .profiles
        .apply_patch(&profile_id, &data)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;

    tracing::info!(
        profile_id = %profile_id,
        user_id = %identity.id(),
        "Profile updated on behalf of user"
    );
    Ok(Json(updated.into_value()))
}
