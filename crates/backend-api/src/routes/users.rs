use axum::{
    extract::{Request, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{routes::models::UserResponse, util::json_body, ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Public ids of the courses the user is enrolled in.
    pub enrolled_courses: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    pub user: UserProfile,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateUserProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

async fn profile_response(
    state: &AppState,
    user: coursehub_database::User,
) -> Result<UserProfileResponse, ApiError> {
    let enrolled_courses = state.enrollments().enrolled_course_ids(&user).await?;
    Ok(UserProfileResponse {
        user: UserProfile {
            user: user.into(),
            enrolled_courses,
        },
    })
}

#[utoipa::path(
    get,
    path = "/user/profile",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfileResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let user = state.authenticate(&headers).await?;
    Ok(Json(profile_response(&state, user).await?))
}

#[utoipa::path(
    put,
    path = "/user/profile",
    tag = "Users",
    security(("bearerAuth" = [])),
    request_body = UpdateUserProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfileResponse),
        (status = 400, description = "Invalid name or email, or email already in use", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let user = state.authenticate(&headers).await?;
    let payload: UpdateUserProfileRequest = json_body(request).await?;
    let updated = state
        .authenticator()
        .update_profile(&user, payload.name.as_deref(), payload.email.as_deref())
        .await?;

    Ok(Json(profile_response(&state, updated).await?))
}
