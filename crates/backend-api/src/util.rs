use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::de::DeserializeOwned;

use crate::ApiError;

/// `axum::Json` whose rejections render as the usual `{"error": ...}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Parse the request body once the caller has been authenticated.
pub async fn json_body<T: DeserializeOwned>(request: Request) -> Result<T, ApiError> {
    let ApiJson(payload) = ApiJson::<T>::from_request(request, &()).await?;
    Ok(payload)
}

pub fn require_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    bearer_token(headers)?.ok_or_else(|| ApiError::unauthorized("missing authorization header"))
}

/// `Ok(None)` when no Authorization header is present; a malformed header
/// is still an error.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("invalid authorization header"))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized("invalid authorization scheme"));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized("missing bearer token"));
    }

    Ok(Some(token.to_string()))
}
