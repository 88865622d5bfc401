//! Error types for catalog, enrollment and admin operations.

use coursehub_auth::AuthError;
use coursehub_database::DatabaseError;
use thiserror::Error;

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    PaymentUnavailable(String),

    #[error("Account error: {0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl From<DatabaseError> for CatalogError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => Self::NotFound(what),
            DatabaseError::Duplicate(what) => Self::Conflict(what),
            DatabaseError::Constraint(what) | DatabaseError::InvalidValue(what) => {
                Self::Validation(what)
            }
            other => Self::Database(other),
        }
    }
}
