//! HTTP glue for access decisions
//!
//! [`route_context`] classifies every inbound request as administrative or
//! public and stores the [`RouteContext`] in the request extensions, where
//! handlers extract it. [`AccessRejection`] maps denials and engine
//! failures to responses.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::RbacConfig;
use crate::decision::{AccessDecision, RouteContext, WriteDecision};
use crate::error::RbacError;
use crate::identity::Identity;

/// Middleware classifying the request route
///
/// Install with `axum::middleware::from_fn_with_state(config, route_context)`.
pub async fn route_context(
    State(config): State<Arc<RbacConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let route = config.route_for(&path);
    request.extensions_mut().insert(route);
    next.run(request).await
}

/// Route context extractor; requests not classified by [`route_context`] count as public
impl<S> FromRequestParts<S> for RouteContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RouteContext>()
            .copied()
            .unwrap_or_default())
    }
}

/// Why a request was not served
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRejection {
    /// Denied and the caller is anonymous
    Unauthenticated,
    /// Denied for an authenticated caller
    Forbidden,
    /// Write refused because of these fields
    FieldsRejected(Vec<String>),
    /// The decision could not be made because a dependency failed
    Unavailable,
    /// Policy configuration or programming error
    Misconfigured,
}

impl AccessRejection {
    /// Rejection for a denied decision, `None` when the decision allows
    pub fn for_decision(decision: &AccessDecision, identity: Option<&Identity>) -> Option<Self> {
        match decision {
            AccessDecision::Deny => Some(Self::denied(identity)),
            AccessDecision::Allow | AccessDecision::FilteredAllow(_) => None,
        }
    }

    /// Rejection for a refused write, `None` when the write may proceed
    pub fn for_write(decision: &WriteDecision, identity: Option<&Identity>) -> Option<Self> {
        match decision {
            WriteDecision::Deny => Some(Self::denied(identity)),
            WriteDecision::FieldsRejected(fields) => Some(Self::FieldsRejected(fields.clone())),
            WriteDecision::Allowed { .. } => None,
        }
    }

    fn denied(identity: Option<&Identity>) -> Self {
        match identity {
            None => Self::Unauthenticated,
            Some(_) => Self::Forbidden,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::FieldsRejected(_) => StatusCode::FORBIDDEN,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RbacError> for AccessRejection {
    fn from(err: RbacError) -> Self {
        if err.is_unavailable() {
            tracing::warn!(outcome = "unavailable", error = %err, "Access decision unavailable");
            Self::Unavailable
        } else {
            tracing::error!(outcome = "error", error = %err, "Access decision failed");
            Self::Misconfigured
        }
    }
}

impl IntoResponse for AccessRejection {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Unauthenticated => {
                tracing::debug!(outcome = "denied", "Anonymous request denied");
                json!({ "error": "Unauthorized" })
            }
            Self::Forbidden => {
                tracing::debug!(outcome = "denied", "Request denied");
                json!({ "error": "Forbidden" })
            }
            Self::FieldsRejected(fields) => {
                tracing::debug!(outcome = "denied", ?fields, "Write denied by field rules");
                json!({ "error": "Forbidden", "fields": fields })
            }
            Self::Unavailable => json!({ "error": "ServiceUnavailable" }),
            Self::Misconfigured => json!({ "error": "InternalServerError" }),
        };

        (status, Json(body)).into_response()
    }
}
