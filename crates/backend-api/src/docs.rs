use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::courses::list_courses,
        crate::routes::courses::get_course,
        crate::routes::courses::create_course,
        crate::routes::enrollments::enroll,
        crate::routes::enrollments::list_enrollments,
        crate::routes::enrollments::pay,
        crate::routes::enrollments::update_progress,
        crate::routes::enrollments::course_content,
        crate::routes::payments::confirm_payment,
        crate::routes::users::get_current_user,
        crate::routes::users::update_current_user,
        crate::routes::admin::overview,
        crate::routes::admin::list_users,
        crate::routes::admin::create_user,
        crate::routes::admin::change_role,
        crate::routes::admin::remove_user,
        crate::routes::admin::set_published,
        crate::routes::admin::set_access
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::SessionResponse,
            crate::routes::models::UserResponse,
            crate::routes::models::CourseResponse,
            crate::routes::models::CourseSummaryResponse,
            crate::routes::models::EnrollmentResponse,
            crate::routes::models::CourseContentResponse,
            crate::routes::models::StudentResponse,
            crate::routes::models::PaymentResponse,
            crate::routes::models::CourseRosterResponse,
            crate::routes::models::StatsResponse,
            crate::routes::models::EnrollmentEnvelope,
            crate::routes::models::CourseEnvelope,
            crate::routes::models::UserEnvelope,
            crate::routes::courses::CoursesResponse,
            crate::routes::courses::CreateCourseRequest,
            crate::routes::enrollments::EnrollRequest,
            crate::routes::enrollments::EnrollmentsResponse,
            crate::routes::enrollments::ProgressRequest,
            crate::routes::enrollments::CourseContentEnvelope,
            crate::routes::payments::PaymentConfirmationRequest,
            crate::routes::users::UserProfile,
            crate::routes::users::UserProfileResponse,
            crate::routes::users::UpdateUserProfileRequest,
            crate::routes::admin::AdminOverviewResponse,
            crate::routes::admin::UsersResponse,
            crate::routes::admin::CreateUserRequest,
            crate::routes::admin::ChangeRoleRequest,
            crate::routes::admin::PublishRequest,
            crate::routes::admin::AccessRequest
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Registration and sign-in"),
        (name = "Users", description = "Profile of the signed-in user"),
        (name = "Courses", description = "Public course catalog"),
        (name = "Enrollments", description = "Enroll, pay and follow a course"),
        (name = "Payments", description = "Payment provider callbacks"),
        (name = "Admin", description = "Admin console")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("JWT".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
