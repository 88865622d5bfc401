use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use coursehub_catalog::CourseInput;
use coursehub_database::{Category, CourseFilter};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    routes::models::{CourseEnvelope, CourseResponse},
    util::json_body,
    ApiError, AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CourseListQuery {
    /// Exact category name, case-insensitive.
    pub category: Option<String>,
    /// Substring matched against title, description and instructor.
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoursesResponse {
    pub courses: Vec<CourseResponse>,
    pub count: usize,
}

impl From<Vec<CourseResponse>> for CoursesResponse {
    fn from(courses: Vec<CourseResponse>) -> Self {
        Self {
            count: courses.len(),
            courses,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub duration_minutes: Option<i64>,
    pub category: Option<String>,
    pub instructor: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub notes_url: Option<String>,
    pub correction_url: Option<String>,
}

impl From<CreateCourseRequest> for CourseInput {
    fn from(value: CreateCourseRequest) -> Self {
        Self {
            title: value.title.unwrap_or_default(),
            description: value.description.unwrap_or_default(),
            price_cents: value.price_cents,
            duration_minutes: value.duration_minutes,
            category: value.category.unwrap_or_default(),
            instructor: value.instructor.unwrap_or_default(),
            image_url: value.image_url,
            video_url: value.video_url,
            notes_url: value.notes_url,
            correction_url: value.correction_url,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[utoipa::path(
    get,
    path = "/courses",
    tag = "Courses",
    params(CourseListQuery),
    responses((status = 200, description = "Published courses, newest first", body = CoursesResponse))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseListQuery>,
) -> Result<Json<CoursesResponse>, ApiError> {
    let category = match non_blank(params.category) {
        Some(raw) => match raw.parse::<Category>() {
            Ok(category) => Some(category),
            // no course can match a category that does not exist
            Err(_) => return Ok(Json(Vec::new().into())),
        },
        None => None,
    };
    let filter = CourseFilter {
        category,
        search: non_blank(params.search),
    };

    let courses = state.catalog().list_published(&filter).await?;
    Ok(Json(
        courses
            .into_iter()
            .map(CourseResponse::from)
            .collect::<Vec<_>>()
            .into(),
    ))
}

#[utoipa::path(
    get,
    path = "/courses/{course_id}",
    tag = "Courses",
    params(("course_id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course details", body = CourseEnvelope),
        (status = 404, description = "Course not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(course_id): Path<String>,
) -> Result<Json<CourseEnvelope>, ApiError> {
    let viewer = state.optional_user(&headers).await?;
    let course = state
        .catalog()
        .get_course(viewer.as_ref(), &course_id)
        .await?;
    Ok(Json(course.into()))
}

#[utoipa::path(
    post,
    path = "/courses",
    tag = "Courses",
    security(("bearerAuth" = [])),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created unpublished", body = CourseEnvelope),
        (status = 400, description = "Missing or invalid fields", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<(StatusCode, Json<CourseEnvelope>), ApiError> {
    let user = state.authenticate(&headers).await?;
    let payload: CreateCourseRequest = json_body(request).await?;
    let course = state
        .catalog()
        .create_course(&user, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(course.into())))
}
