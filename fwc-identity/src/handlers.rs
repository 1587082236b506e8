//! Bridge endpoints called by the sign-in front end

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{IdentityError, IdentityResult};
use crate::provisioning::UserProvisioner;
use crate::user::UserSummary;

/// Header carrying the shared secret on resolve-user calls
pub const INTERNAL_SECRET_HEADER: &str = "x-internal-secret";

/// Shared state of the bridge endpoints
#[derive(Clone)]
pub struct IdentityState {
    pub provisioner: UserProvisioner,
    /// Shared secret expected from internal callers; all calls fail when unset
    pub internal_secret: Option<Arc<str>>,
}

impl IdentityState {
    pub fn new(provisioner: UserProvisioner, internal_secret: Option<String>) -> Self {
        Self {
            provisioner,
            internal_secret: internal_secret.map(Arc::from),
        }
    }

    fn check_secret(&self, presented: Option<&str>) -> IdentityResult<()> {
        let Some(expected) = self.internal_secret.as_deref() else {
            tracing::warn!(outcome = "denied", "Internal secret not configured; rejecting call");
            return Err(IdentityError::Unauthorized);
        };

        match presented {
            Some(presented) if presented == expected => Ok(()),
            _ => {
                tracing::debug!(outcome = "denied", "Internal call with wrong secret");
                Err(IdentityError::Unauthorized)
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveUserRequest {
    #[serde(default)]
    pub auth0_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkUserRequest {
    #[serde(default)]
    pub neon_user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkUserResponse {
    pub success: bool,
    pub user: UserSummary,
}

/// Routes of the identity bridge
pub fn routes(state: IdentityState) -> Router {
    Router::new()
        .route("/api/internal/resolve-user", post(resolve_user))
        .route("/api/link-neon-user", post(link_user))
        .with_state(state)
}

/// Unreadable bodies are treated as empty so field checks report them
fn body_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable request body");
            T::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// `POST /api/internal/resolve-user`
pub async fn resolve_user(
    State(state): State<IdentityState>,
    headers: HeaderMap,
    body: Result<Json<ResolveUserRequest>, JsonRejection>,
) -> IdentityResult<Json<UserSummary>> {
    let presented = headers
        .get(INTERNAL_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    state.check_secret(presented)?;

    let request = body_or_default(body);
    let auth0_id = non_empty(request.auth0_id).ok_or_else(|| IdentityError::missing("auth0Id"))?;

    let user = state
        .provisioner
        .resolve(&auth0_id, request.email.as_deref())
        .await?;
    Ok(Json(user.summary()))
}

/// `POST /api/link-neon-user`
pub async fn link_user(
    State(state): State<IdentityState>,
    headers: HeaderMap,
    body: Result<Json<LinkUserRequest>, JsonRejection>,
) -> IdentityResult<Json<LinkUserResponse>> {
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    state.check_secret(presented)?;

    let request = body_or_default(body);
    let neon_user_id =
        non_empty(request.neon_user_id).ok_or_else(|| IdentityError::missing("neonUserId"))?;
    let email = non_empty(request.email).ok_or_else(|| IdentityError::missing("email"))?;

    let user = state.provisioner.link(&neon_user_id, &email).await?;
    Ok(Json(LinkUserResponse {
        success: true,
        user: user.summary(),
    }))
}
