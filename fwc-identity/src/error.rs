//! Error types for the identity bridge

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type for identity operations
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity bridge errors
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Caller presented a missing or wrong shared secret
    #[error("Unauthorized")]
    Unauthorized,

    /// A required request field was absent or empty
    #[error("Missing field: {field}")]
    MissingField { field: &'static str },

    /// The user store failed
    #[error("User store error: {message}")]
    Store { message: String },

    /// Pushing roles to the identity provider failed
    #[error("Role sync failed: {message}")]
    RoleSync { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl IdentityError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn role_sync(message: impl Into<String>) -> Self {
        Self::RoleSync {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingField { .. } => StatusCode::BAD_REQUEST,
            Self::RoleSync { .. } => StatusCode::BAD_GATEWAY,
            Self::Store { .. } | Self::InvalidConfig { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        Self::role_sync(err.to_string())
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::MissingField { field } => format!("Missing {field}"),
            Self::Store { .. } | Self::InvalidConfig { .. } => {
                tracing::error!(outcome = "error", error = %self, "Identity request failed");
                "Internal resolve-user failure".to_string()
            }
            Self::RoleSync { .. } => {
                tracing::error!(outcome = "error", error = %self, "Identity provider sync failed");
                "Identity provider sync failed".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
