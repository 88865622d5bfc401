use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use coursehub_catalog::SIGNATURE_HEADER;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{routes::models::EnrollmentEnvelope, ApiError, AppState};

const WEBHOOK_PROVIDER: &str = "webhook";

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmationRequest {
    pub enrollment_id: String,
    pub confirmation_id: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub provider: Option<String>,
}

/// Provider callback. The raw body is authenticated with the shared webhook
/// secret before it is parsed, and replays of a confirmation are no-ops.
#[utoipa::path(
    post,
    path = "/payments/confirm",
    tag = "Payments",
    request_body = PaymentConfirmationRequest,
    params(("X-Payment-Signature" = String, Header, description = "hex(HMAC-SHA256(secret, body))")),
    responses(
        (status = 200, description = "Enrollment after the confirmation", body = EnrollmentEnvelope),
        (status = 400, description = "Malformed payload, wrong amount or reused confirmation", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid signature", body = crate::error::ErrorResponse),
        (status = 404, description = "Enrollment not found", body = crate::error::ErrorResponse),
        (status = 503, description = "Webhook not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<EnrollmentEnvelope>, ApiError> {
    let verifier = state
        .webhook()
        .ok_or_else(|| ApiError::service_unavailable("Payment webhook is not configured"))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing payment signature"))?;
    if !verifier.verify(&body, signature) {
        warn!("payment webhook rejected: bad signature");
        return Err(ApiError::unauthorized("invalid payment signature"));
    }

    let payload: PaymentConfirmationRequest = serde_json::from_slice(&body)
        .map_err(|err| ApiError::bad_request(format!("Invalid payment payload: {err}")))?;
    let provider = payload.provider.as_deref().unwrap_or(WEBHOOK_PROVIDER);

    let outcome = state
        .enrollments()
        .confirm_payment(
            &payload.enrollment_id,
            &payload.confirmation_id,
            payload.amount_cents,
            provider,
        )
        .await?;
    info!(
        enrollment = %payload.enrollment_id,
        applied = outcome.was_applied(),
        "payment webhook processed"
    );

    Ok(Json(outcome.into_enrollment().into()))
}
