//! Storage errors

use sea_orm::DbErr;
use thiserror::Error;

use fwc_identity::IdentityError;
use fwc_rbac::ProfileStoreError;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored or submitted data has the wrong shape
    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },
}

impl StorageError {
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }
}

impl From<StorageError> for IdentityError {
    fn from(err: StorageError) -> Self {
        IdentityError::store(err.to_string())
    }
}

impl From<StorageError> for ProfileStoreError {
    fn from(err: StorageError) -> Self {
        ProfileStoreError::new(err.to_string())
    }
}
