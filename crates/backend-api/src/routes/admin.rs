use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use coursehub_database::UserRole;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    routes::models::{
        CourseEnvelope, CourseRosterResponse, EnrollmentEnvelope, StatsResponse, UserEnvelope,
        UserResponse,
    },
    util::json_body,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOverviewResponse {
    pub courses: Vec<CourseRosterResponse>,
    pub stats: StatsResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
    pub count: usize,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    /// Defaults to `learner`.
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishRequest {
    pub published: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AccessRequest {
    pub enabled: bool,
}

fn parse_role(raw: &str) -> Result<UserRole, ApiError> {
    raw.parse::<UserRole>()
        .map_err(|err| ApiError::bad_request(err.to_string()))
}

#[utoipa::path(
    get,
    path = "/admin/overview",
    tag = "Admin",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Every course with its roster, plus platform totals", body = AdminOverviewResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse)
    )
)]
pub async fn overview(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminOverviewResponse>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let overview = state.catalog().admin_overview(&actor).await?;
    Ok(Json(AdminOverviewResponse {
        courses: overview.courses.into_iter().map(Into::into).collect(),
        stats: overview.stats.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "All users, oldest first", body = UsersResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UsersResponse>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let users: Vec<UserResponse> = state
        .user_admin()
        .list_users(&actor)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(UsersResponse {
        count: users.len(),
        users,
    }))
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "Admin",
    security(("bearerAuth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserEnvelope),
        (status = 400, description = "Invalid fields, unknown role or duplicate email", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    let actor = state.authenticate(&headers).await?;
    let payload: CreateUserRequest = json_body(request).await?;
    let role = match payload.role.as_deref() {
        Some(raw) => parse_role(raw)?,
        None => UserRole::Learner,
    };
    let user = state
        .user_admin()
        .create_user(
            &actor,
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
            payload.name.as_deref().unwrap_or_default(),
            role,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    put,
    path = "/admin/users/{user_id}/role",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("user_id" = String, Path, description = "User id")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = UserEnvelope),
        (status = 400, description = "Unknown role", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required or bootstrap administrator", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn change_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    request: Request,
) -> Result<Json<UserEnvelope>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let payload: ChangeRoleRequest = json_body(request).await?;
    let role = parse_role(&payload.role)?;
    let user = state
        .user_admin()
        .change_role(&actor, &user_id, role)
        .await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{user_id}",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User removed with their enrollments"),
        (status = 403, description = "Admin access required or bootstrap administrator", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let actor = state.authenticate(&headers).await?;
    state.user_admin().remove_user(&actor, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/admin/courses/{course_id}/publish",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("course_id" = String, Path, description = "Course id")),
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Publication changed", body = CourseEnvelope),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
        (status = 404, description = "Course not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_published(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(course_id): Path<String>,
    request: Request,
) -> Result<Json<CourseEnvelope>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let payload: PublishRequest = json_body(request).await?;
    let course = state
        .catalog()
        .set_published(&actor, &course_id, payload.published)
        .await?;
    Ok(Json(course.into()))
}

#[utoipa::path(
    put,
    path = "/admin/enrollments/{enrollment_id}/access",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("enrollment_id" = String, Path, description = "Enrollment id")),
    request_body = AccessRequest,
    responses(
        (status = 200, description = "Access flag updated", body = EnrollmentEnvelope),
        (status = 400, description = "Enrollment is not paid", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
        (status = 404, description = "Enrollment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(enrollment_id): Path<String>,
    request: Request,
) -> Result<Json<EnrollmentEnvelope>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let payload: AccessRequest = json_body(request).await?;
    let enrollment = state
        .enrollments()
        .set_access(&actor, &enrollment_id, payload.enabled)
        .await?;
    Ok(Json(enrollment.into()))
}
