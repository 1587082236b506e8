//! HTTP error responses of the server's own endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use fwc_identity::IdentityError;
use fwc_rbac::{AccessRejection, RbacError};
use fwc_storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Missing required fields")]
    MissingFields,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Access rejected: {0:?}")]
    Access(AccessRejection),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl From<AccessRejection> for ApiError {
    fn from(rejection: AccessRejection) -> Self {
        Self::Access(rejection)
    }
}

impl From<RbacError> for ApiError {
    fn from(err: RbacError) -> Self {
        Self::Access(AccessRejection::from(err))
    }
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Access(rejection) => rejection.into_response(),
            Self::Identity(err) => err.into_response(),
            Self::Unauthorized => error_body(StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::MissingFields => error_body(StatusCode::BAD_REQUEST, "Missing required fields"),
            Self::NotFound(what) => error_body(StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::Storage(StorageError::InvalidRecord { message }) => {
                error_body(StatusCode::BAD_REQUEST, message)
            }
            Self::Storage(err) => {
                tracing::error!(outcome = "error", error = %err, "Storage failure");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError")
            }
        }
    }
}
