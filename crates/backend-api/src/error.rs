use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coursehub_auth::AuthError;
use coursehub_catalog::CatalogError;
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        let status = match &error {
            AuthError::Validation(_) | AuthError::UserExists => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Database(_) | AuthError::PasswordHash(_) | AuthError::Internal(_) => {
                error!(error = ?error, "auth error");
                return Self::internal_server_error();
            }
        };
        warn!(status = status.as_u16(), error = %error, "auth request rejected");
        Self::new(status, error.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        let status = match error {
            CatalogError::Auth(inner) => return Self::from(inner),
            CatalogError::Database(ref inner) => {
                error!(error = ?inner, "database error");
                return Self::internal_server_error();
            }
            CatalogError::Validation(_) | CatalogError::Conflict(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Forbidden(_) => StatusCode::FORBIDDEN,
            CatalogError::PaymentUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        warn!(status = status.as_u16(), error = %error, "request rejected");
        Self::new(status, error.to_string())
    }
}
