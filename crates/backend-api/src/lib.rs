//! # CourseHub Backend API
//!
//! The axum router exposing the catalog, enrollment, payment webhook,
//! profile and admin console endpoints as JSON over HTTP.

mod error;
mod state;
mod util;

pub mod docs;
pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    routing::{delete, get, post, put},
    Router,
};
use coursehub_catalog::SIGNATURE_HEADER;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth routes
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        // Catalog routes
        .route(
            "/courses",
            get(routes::courses::list_courses).post(routes::courses::create_course),
        )
        .route("/courses/:course_id", get(routes::courses::get_course))
        // Enrollment routes
        .route(
            "/enrollments",
            get(routes::enrollments::list_enrollments).post(routes::enrollments::enroll),
        )
        .route(
            "/enrollments/:enrollment_id/pay",
            post(routes::enrollments::pay),
        )
        .route(
            "/enrollments/:enrollment_id/progress",
            put(routes::enrollments::update_progress),
        )
        .route(
            "/enrollments/:enrollment_id/content",
            get(routes::enrollments::course_content),
        )
        .route("/payments/confirm", post(routes::payments::confirm_payment))
        .route(
            "/user/profile",
            get(routes::users::get_current_user).put(routes::users::update_current_user),
        )
        // Admin console routes
        .route("/admin/overview", get(routes::admin::overview))
        .route(
            "/admin/users",
            get(routes::admin::list_users).post(routes::admin::create_user),
        )
        .route(
            "/admin/users/:user_id/role",
            put(routes::admin::change_role),
        )
        .route("/admin/users/:user_id", delete(routes::admin::remove_user))
        .route(
            "/admin/courses/:course_id/publish",
            put(routes::admin::set_published),
        )
        .route(
            "/admin/enrollments/:enrollment_id/access",
            put(routes::admin::set_access),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static(SIGNATURE_HEADER),
        ])
}
