use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, AUTHORIZATION,
            CONTENT_TYPE, ORIGIN,
        },
        Method, Request, StatusCode,
    },
    Router,
};
use coursehub_auth::Authenticator;
use coursehub_backend_api::{build_router, AppState};
use coursehub_catalog::{SimulatedGateway, WebhookVerifier, SIGNATURE_HEADER};
use coursehub_config::AppConfig;
use coursehub_database::initialize_database;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

type TestResult<T = ()> = anyhow::Result<T>;

const ADMIN_PASSWORD: &str = "admin-password-123";
const WEBHOOK_SECRET: &str = "whsec_api_tests";

struct TestContext {
    _temp_dir: TempDir,
    state: AppState,
    config: AppConfig,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        Self::with_webhook(Some(WEBHOOK_SECRET)).await
    }

    async fn with_webhook(secret: Option<&str>) -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("backend_api.sqlite");

        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", db_path.display());
        config.database.max_connections = 5;
        config.bootstrap.admin_password = Some(ADMIN_PASSWORD.into());

        let pool = initialize_database(&config.database).await?;
        let authenticator = Authenticator::new(pool.clone(), &config.auth);
        authenticator
            .ensure_bootstrap_admin(&config.bootstrap)
            .await?;

        let state = AppState::new(
            pool,
            authenticator,
            Arc::new(SimulatedGateway::new(Duration::ZERO)),
            secret.map(WebhookVerifier::new),
        );

        Ok(Self {
            _temp_dir: temp_dir,
            state,
            config,
        })
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResult<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResult<(StatusCode, Value)> {
        let response = self.router().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok((status, value))
    }

    async fn admin_token(&self) -> TestResult<String> {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({
                    "email": self.config.bootstrap.admin_email,
                    "password": ADMIN_PASSWORD,
                })),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "{body}");
        token_of(&body)
    }

    /// Register a learner, returning (user id, token).
    async fn register(&self, email: &str) -> TestResult<(String, String)> {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "email": email, "password": "password123", "name": "Learner" })),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        Ok((str_at(&body, "/user/id")?, token_of(&body)?))
    }

    /// Create and publish a course as admin, returning its id.
    async fn published_course(
        &self,
        admin: &str,
        title: &str,
        category: &str,
    ) -> TestResult<String> {
        let course_id = self.draft_course(admin, title, category).await?;
        let (status, body) = self
            .send(
                Method::PUT,
                &format!("/admin/courses/{course_id}/publish"),
                Some(admin),
                Some(json!({ "published": true })),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "{body}");
        Ok(course_id)
    }

    async fn draft_course(&self, admin: &str, title: &str, category: &str) -> TestResult<String> {
        let (status, body) = self
            .send(
                Method::POST,
                "/courses",
                Some(admin),
                Some(course_payload(title, category)),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        str_at(&body, "/course/id")
    }

    async fn enroll(&self, token: &str, user_id: &str, course_id: &str) -> TestResult<String> {
        let (status, body) = self
            .send(
                Method::POST,
                "/enrollments",
                Some(token),
                Some(json!({ "userId": user_id, "courseId": course_id })),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        str_at(&body, "/enrollment/id")
    }

    async fn webhook(&self, body: &Value, signature: Option<&str>) -> TestResult<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/payments/confirm")
            .header(CONTENT_TYPE, "application/json");
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        let request = builder.body(Body::from(serde_json::to_vec(body)?))?;
        self.dispatch(request).await
    }
}

fn course_payload(title: &str, category: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{title} from first principles"),
        "priceCents": 500,
        "durationMinutes": 480,
        "category": category,
        "instructor": "Dr. Sarah Johnson",
        "videoUrl": "https://videos.example/intro.mp4",
        "notesUrl": "https://notes.example/intro.pdf",
    })
}

fn str_at(body: &Value, pointer: &str) -> TestResult<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .with_context(|| format!("missing {pointer} in {body}"))
}

fn token_of(body: &Value) -> TestResult<String> {
    str_at(body, "/token")
}

fn sign(body: &Value) -> TestResult<String> {
    let bytes = serde_json::to_vec(body)?;
    Ok(WebhookVerifier::new(WEBHOOK_SECRET).sign(&bytes)?)
}

#[tokio::test]
async fn health_check_reports_ok() -> TestResult {
    let ctx = TestContext::new().await?;
    let (status, body) = ctx.send(Method::GET, "/health", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn register_returns_user_and_token() -> TestResult {
    let ctx = TestContext::new().await?;
    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "Ada@Example.com", "password": "password123", "name": "Ada" })),
        )
        .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "learner");
    assert_eq!(body["user"]["isBootstrap"], false);
    assert!(body["user"].get("passwordHash").is_none());
    assert!(!token_of(&body)?.is_empty());
    Ok(())
}

#[tokio::test]
async fn register_rejects_duplicates_and_missing_fields() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.register("dup@example.com").await?;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "dup@example.com", "password": "password123", "name": "Again" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "missing@example.com" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.register("login@example.com").await?;

    let (status, _) = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "login@example.com", "password": "password123" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "login@example.com", "password": "wrong-password" })),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, _) = ctx.send(Method::GET, "/user/profile", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(Method::GET, "/user/profile", Some("not-a-jwt"), None)
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_are_json_bad_requests() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx
        .send(Method::POST, "/auth/register", None, Some(json!({ "email": 5 })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let (status, body) = ctx.dispatch(request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .body(Body::from(r#"{"email": "a@example.com"}"#))?;
    let (status, body) = ctx.dispatch(request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let admin = ctx.admin_token().await?;
    let (status, body) = ctx
        .send(
            Method::POST,
            "/courses",
            Some(admin.as_str()),
            Some(json!({ "title": ["not", "a", "string"] })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
    Ok(())
}

#[tokio::test]
async fn authentication_is_checked_before_the_body() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx
        .send(Method::POST, "/courses", None, Some(json!({ "title": 5 })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string(), "{body}");

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/user/profile")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{broken"))?;
    let (status, _) = ctx.dispatch(request).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn enrollment_starts_unpaid_and_disabled() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx.admin_token().await?;
    let course_id = ctx
        .published_course(&admin, "Introduction to Microeconomics", "Economics")
        .await?;
    let (user_id, token) = ctx.register("a@example.com").await?;

    ctx.enroll(&token, &user_id, &course_id).await?;

    let (status, body) = ctx
        .send(
            Method::GET,
            &format!("/enrollments?userId={user_id}"),
            Some(token.as_str()),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["count"], 1);
    let enrollment = &body["enrollments"][0];
    assert_eq!(enrollment["courseId"], course_id.as_str());
    assert_eq!(enrollment["isPaid"], false);
    assert_eq!(enrollment["isEnabled"], false);
    assert_eq!(enrollment["progress"], 0);
    assert_eq!(enrollment["course"]["title"], "Introduction to Microeconomics");

    let (_, profile) = ctx.send(Method::GET, "/user/profile", Some(token.as_str()), None).await?;
    assert_eq!(profile["user"]["enrolledCourses"], json!([course_id]));
    Ok(())
}

#[tokio::test]
async fn enrolling_twice_is_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx.admin_token().await?;
    let course_id = ctx.published_course(&admin, "Marketing 101", "Marketing").await?;
    let (user_id, token) = ctx.register("twice@example.com").await?;
    ctx.enroll(&token, &user_id, &course_id).await?;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/enrollments",
            Some(token.as_str()),
            Some(json!({ "userId": user_id, "courseId": course_id })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User is already enrolled in this course");

    let (_, body) = ctx
        .send(
            Method::GET,
            &format!("/enrollments?userId={user_id}"),
            Some(token.as_str()),
            None,
        )
        .await?;
    assert_eq!(body["count"], 1);
    Ok(())
}

#[tokio::test]
async fn enroll_validates_references_and_ownership() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx.admin_token().await?;
    let course_id = ctx.published_course(&admin, "Finance Basics", "Finance").await?;
    let (user_a, token_a) = ctx.register("owner@example.com").await?;
    let (user_b, _) = ctx.register("other@example.com").await?;

    let (status, _) = ctx
        .send(
            Method::POST,
            "/enrollments",
            Some(token_a.as_str()),
            Some(json!({ "userId": user_a })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(
            Method::POST,
            "/enrollments",
            Some(token_a.as_str()),
            Some(json!({ "userId": user_a, "courseId": "missing-course" })),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send(
            Method::POST,
            "/enrollments",
            Some(token_a.as_str()),
            Some(json!({ "userId": user_b, "courseId": course_id })),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(
            Method::GET,
            &format!("/enrollments?userId={user_b}"),
            Some(token_a.as_str()),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send(Method::GET, "/enrollments", Some(token_a.as_str()), None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User ID is required");

    // admins may enroll anyone
    ctx.enroll(&admin, &user_b, &course_id).await?;
    Ok(())
}

#[tokio::test]
async fn access_requires_payment_then_unlocks_content() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx.admin_token().await?;
    let course_id = ctx
        .published_course(&admin, "Startup Fundamentals", "Entrepreneurship")
        .await?;
    let (user_id, token) = ctx.register("payer@example.com").await?;
    let enrollment_id = ctx.enroll(&token, &user_id, &course_id).await?;
    let access_uri = format!("/admin/enrollments/{enrollment_id}/access");

    let (status, _) = ctx
        .send(Method::PUT, &access_uri, Some(admin.as_str()), Some(json!({ "enabled": true })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(
            Method::GET,
            &format!("/enrollments/{enrollment_id}/content"),
            Some(token.as_str()),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send(
            Method::POST,
            &format!("/enrollments/{enrollment_id}/pay"),
            Some(token.as_str()),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["enrollment"]["isPaid"], true);
    assert!(body["enrollment"]["paidAt"].is_string());

    let (status, _) = ctx
        .send(Method::PUT, &access_uri, Some(token.as_str()), Some(json!({ "enabled": true })))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send(Method::PUT, &access_uri, Some(admin.as_str()), Some(json!({ "enabled": true })))
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["enrollment"]["isEnabled"], true);

    let (_, body) = ctx
        .send(
            Method::GET,
            &format!("/enrollments?userId={user_id}"),
            Some(token.as_str()),
            None,
        )
        .await?;
    assert_eq!(body["enrollments"][0]["isEnabled"], true);

    let (status, body) = ctx
        .send(
            Method::GET,
            &format!("/enrollments/{enrollment_id}/content"),
            Some(token.as_str()),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["content"]["videoUrl"], "https://videos.example/intro.mp4");

    let (status, body) = ctx
        .send(
            Method::PUT,
            &format!("/enrollments/{enrollment_id}/progress"),
            Some(token.as_str()),
            Some(json!({ "progress": 100 })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["enrollment"]["completed"], true);

    let (status, _) = ctx
        .send(
            Method::PUT,
            &format!("/enrollments/{enrollment_id}/progress"),
            Some(token.as_str()),
            Some(json!({ "progress": 101 })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn paying_twice_is_a_no_op() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx.admin_token().await?;
    let course_id = ctx.published_course(&admin, "Business Strategy", "Business").await?;
    let (user_id, token) = ctx.register("twice-pay@example.com").await?;
    let enrollment_id = ctx.enroll(&token, &user_id, &course_id).await?;
    let uri = format!("/enrollments/{enrollment_id}/pay");

    let (_, first) = ctx.send(Method::POST, &uri, Some(token.as_str()), None).await?;
    let (status, second) = ctx.send(Method::POST, &uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["enrollment"]["paidAt"], second["enrollment"]["paidAt"]);

    let (_, overview) = ctx.send(Method::GET, "/admin/overview", Some(admin.as_str()), None).await?;
    assert_eq!(overview["stats"]["paidEnrollments"], 1);
    assert_eq!(overview["stats"]["revenueCents"], 500);
    Ok(())
}

#[tokio::test]
async fn webhook_confirms_payment_once() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx.admin_token().await?;
    let course_id = ctx.published_course(&admin, "Personal Finance", "Finance").await?;
    let (user_id, token) = ctx.register("hook@example.com").await?;
    let enrollment_id = ctx.enroll(&token, &user_id, &course_id).await?;

    let payload = json!({
        "enrollmentId": enrollment_id,
        "confirmationId": "pay_123",
        "amountCents": 500,
    });

    let (status, _) = ctx.webhook(&payload, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = ctx.webhook(&payload, Some("deadbeef")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let signature = sign(&payload)?;
    let (status, first) = ctx.webhook(&payload, Some(signature.as_str())).await?;
    assert_eq!(status, StatusCode::OK, "{first}");
    assert_eq!(first["enrollment"]["isPaid"], true);

    let (status, replay) = ctx.webhook(&payload, Some(signature.as_str())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["enrollment"]["paidAt"], replay["enrollment"]["paidAt"]);

    let wrong_amount = json!({
        "enrollmentId": enrollment_id,
        "confirmationId": "pay_456",
        "amountCents": 1,
    });
    let wrong_signature = sign(&wrong_amount)?;
    let (status, _) = ctx
        .webhook(&wrong_amount, Some(wrong_signature.as_str()))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, overview) = ctx.send(Method::GET, "/admin/overview", Some(admin.as_str()), None).await?;
    assert_eq!(overview["stats"]["paidEnrollments"], 1);
    assert_eq!(overview["stats"]["recordedPayments"], 1);
    let payment = &overview["courses"][0]["students"][0]["payment"];
    assert_eq!(payment["confirmationId"], "pay_123");
    assert_eq!(payment["amountCents"], 500);
    Ok(())
}

#[tokio::test]
async fn webhook_is_unavailable_without_a_secret() -> TestResult {
    let ctx = TestContext::with_webhook(None).await?;
    let payload = json!({ "enrollmentId": "x", "confirmationId": "y", "amountCents": 1 });

    let (status, body) = ctx.webhook(&payload, Some("00")).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn course_creation_is_admin_only() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, token) = ctx.register("learner@example.com").await?;

    let (status, _) = ctx
        .send(Method::POST, "/courses", None, Some(course_payload("Nope", "Business")))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = ctx
        .send(
            Method::POST,
            "/courses",
            Some(token.as_str()),
            Some(course_payload("Nope", "Business")),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "admin access required");

    let admin = ctx.admin_token().await?;
    let (status, _) = ctx
        .send(
            Method::POST,
            "/courses",
            Some(admin.as_str()),
            Some(json!({ "title": "Incomplete" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn catalog_lists_published_courses_only() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx.admin_token().await?;
    let economics = ctx
        .published_course(&admin, "Macroeconomics Explained", "Economics")
        .await?;
    ctx.published_course(&admin, "Digital Marketing", "Marketing")
        .await?;
    let draft = ctx.draft_course(&admin, "Draft Economics", "Economics").await?;

    let (_, body) = ctx.send(Method::GET, "/courses", None, None).await?;
    assert_eq!(body["count"], 2);
    assert_eq!(body["courses"][0]["title"], "Digital Marketing");

    let (_, body) = ctx
        .send(Method::GET, "/courses?category=economics", None, None)
        .await?;
    assert_eq!(body["count"], 1);
    assert_eq!(body["courses"][0]["id"], economics.as_str());

    let (_, body) = ctx
        .send(Method::GET, "/courses?search=SARAH", None, None)
        .await?;
    assert_eq!(body["count"], 2);

    let (status, body) = ctx
        .send(Method::GET, "/courses?category=Cooking", None, None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (status, _) = ctx
        .send(Method::GET, &format!("/courses/{draft}"), None, None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx
        .send(Method::GET, &format!("/courses/{draft}"), Some(admin.as_str()), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["course"]["isPublished"], false);
    Ok(())
}

#[tokio::test]
async fn bootstrap_admin_cannot_be_modified() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx.admin_token().await?;
    let (_, profile) = ctx.send(Method::GET, "/user/profile", Some(admin.as_str()), None).await?;
    let admin_id = str_at(&profile, "/user/id")?;
    assert_eq!(profile["user"]["isBootstrap"], true);

    let (status, _) = ctx
        .send(
            Method::PUT,
            &format!("/admin/users/{admin_id}/role"),
            Some(admin.as_str()),
            Some(json!({ "role": "learner" })),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(Method::DELETE, &format!("/admin/users/{admin_id}"), Some(admin.as_str()), None)
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, profile) = ctx.send(Method::GET, "/user/profile", Some(admin.as_str()), None).await?;
    assert_eq!(profile["user"]["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn admin_manages_users() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx.admin_token().await?;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/admin/users",
            Some(admin.as_str()),
            Some(json!({
                "email": "teacher@example.com",
                "password": "password123",
                "name": "Teacher",
                "role": "instructor",
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["user"]["role"], "instructor");
    let user_id = str_at(&body, "/user/id")?;

    let (status, _) = ctx
        .send(
            Method::PUT,
            &format!("/admin/users/{user_id}/role"),
            Some(admin.as_str()),
            Some(json!({ "role": "wizard" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .send(
            Method::PUT,
            &format!("/admin/users/{user_id}/role"),
            Some(admin.as_str()),
            Some(json!({ "role": "admin" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");

    let (_, body) = ctx.send(Method::GET, "/admin/users", Some(admin.as_str()), None).await?;
    assert_eq!(body["count"], 2);

    let (status, body) = ctx
        .send(Method::DELETE, &format!("/admin/users/{user_id}"), Some(admin.as_str()), None)
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = ctx
        .send(Method::DELETE, &format!("/admin/users/{user_id}"), Some(admin.as_str()), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, learner) = ctx.register("plain@example.com").await?;
    let (status, _) = ctx.send(Method::GET, "/admin/users", Some(learner.as_str()), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn removed_user_token_is_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx.admin_token().await?;
    let (user_id, token) = ctx.register("gone@example.com").await?;

    ctx.send(Method::DELETE, &format!("/admin/users/{user_id}"), Some(admin.as_str()), None)
        .await?;

    let (status, _) = ctx.send(Method::GET, "/user/profile", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn profile_can_be_updated() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, token) = ctx.register("rename@example.com").await?;
    ctx.register("taken@example.com").await?;

    let (status, body) = ctx
        .send(
            Method::PUT,
            "/user/profile",
            Some(token.as_str()),
            Some(json!({ "name": "Renamed" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Renamed");
    assert_eq!(body["user"]["email"], "rename@example.com");

    let (status, _) = ctx
        .send(
            Method::PUT,
            "/user/profile",
            Some(token.as_str()),
            Some(json!({ "email": "taken@example.com" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_signature_header() -> TestResult {
    let ctx = TestContext::new().await?;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/payments/confirm")
        .header(ORIGIN, "http://localhost:3000")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(ACCESS_CONTROL_REQUEST_HEADERS, SIGNATURE_HEADER)
        .body(Body::empty())?;

    let response = ctx.router().oneshot(request).await?;
    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(
        headers
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let allowed = headers
        .get(ACCESS_CONTROL_ALLOW_HEADERS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(allowed.contains(SIGNATURE_HEADER));
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> TestResult {
    let ctx = TestContext::new().await?;
    let (status, body) = ctx
        .send(Method::GET, "/api-docs/openapi.json", None, None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/enrollments"].is_object());
    Ok(())
}
