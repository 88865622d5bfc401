use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    routes::models::{CourseContentResponse, EnrollmentEnvelope, EnrollmentResponse},
    util::json_body,
    ApiError, AppState,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct EnrollRequest {
    pub user_id: Option<String>,
    pub course_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentListQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentsResponse {
    pub enrollments: Vec<EnrollmentResponse>,
    pub count: usize,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProgressRequest {
    pub progress: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseContentEnvelope {
    pub content: CourseContentResponse,
}

#[utoipa::path(
    post,
    path = "/enrollments",
    tag = "Enrollments",
    security(("bearerAuth" = [])),
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrollment created unpaid and disabled", body = EnrollmentEnvelope),
        (status = 400, description = "Missing ids or already enrolled", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Cannot enroll another user", body = crate::error::ErrorResponse),
        (status = 404, description = "User or course not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn enroll(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<(StatusCode, Json<EnrollmentEnvelope>), ApiError> {
    let actor = state.authenticate(&headers).await?;
    let payload: EnrollRequest = json_body(request).await?;
    let enrollment = state
        .enrollments()
        .enroll(
            &actor,
            payload.user_id.as_deref().unwrap_or_default(),
            payload.course_id.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

#[utoipa::path(
    get,
    path = "/enrollments",
    tag = "Enrollments",
    security(("bearerAuth" = [])),
    params(EnrollmentListQuery),
    responses(
        (status = 200, description = "Enrollments with course summaries, newest first", body = EnrollmentsResponse),
        (status = 400, description = "User ID is required", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_enrollments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<EnrollmentListQuery>,
) -> Result<Json<EnrollmentsResponse>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let enrollments = state
        .enrollments()
        .list_for_user(&actor, params.user_id.as_deref().unwrap_or_default())
        .await?;

    let enrollments: Vec<EnrollmentResponse> =
        enrollments.into_iter().map(EnrollmentResponse::from).collect();
    Ok(Json(EnrollmentsResponse {
        count: enrollments.len(),
        enrollments,
    }))
}

#[utoipa::path(
    post,
    path = "/enrollments/{enrollment_id}/pay",
    tag = "Enrollments",
    security(("bearerAuth" = [])),
    params(("enrollment_id" = String, Path, description = "Enrollment id")),
    responses(
        (status = 200, description = "Enrollment after payment", body = EnrollmentEnvelope),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Enrollment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn pay(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(enrollment_id): Path<String>,
) -> Result<Json<EnrollmentEnvelope>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let enrollment = state.enrollments().pay(&actor, &enrollment_id).await?;
    Ok(Json(enrollment.into()))
}

#[utoipa::path(
    put,
    path = "/enrollments/{enrollment_id}/progress",
    tag = "Enrollments",
    security(("bearerAuth" = [])),
    params(("enrollment_id" = String, Path, description = "Enrollment id")),
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Progress recorded", body = EnrollmentEnvelope),
        (status = 400, description = "Progress outside 0..=100", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner or access not enabled", body = crate::error::ErrorResponse),
        (status = 404, description = "Enrollment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(enrollment_id): Path<String>,
    request: Request,
) -> Result<Json<EnrollmentEnvelope>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let payload: ProgressRequest = json_body(request).await?;
    let progress = payload
        .progress
        .ok_or_else(|| ApiError::bad_request("Progress is required"))?;
    let enrollment = state
        .enrollments()
        .update_progress(&actor, &enrollment_id, progress)
        .await?;
    Ok(Json(enrollment.into()))
}

#[utoipa::path(
    get,
    path = "/enrollments/{enrollment_id}/content",
    tag = "Enrollments",
    security(("bearerAuth" = [])),
    params(("enrollment_id" = String, Path, description = "Enrollment id")),
    responses(
        (status = 200, description = "Course material links", body = CourseContentEnvelope),
        (status = 403, description = "Not paid and enabled", body = crate::error::ErrorResponse),
        (status = 404, description = "Enrollment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn course_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(enrollment_id): Path<String>,
) -> Result<Json<CourseContentEnvelope>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let content = state
        .enrollments()
        .course_content(&actor, &enrollment_id)
        .await?;
    Ok(Json(CourseContentEnvelope {
        content: content.into(),
    }))
}
