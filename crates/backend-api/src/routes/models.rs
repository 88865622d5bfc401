//! Response bodies shared between route modules. Every field is rendered in
//! camelCase and identifiers are the public ids, never row ids.

use coursehub_catalog::{CourseContent, CourseWithStudents, PlatformStats, RosterEntry};
use coursehub_database::{Course, CourseSummary, Enrollment, EnrollmentWithCourse, Payment, User};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    /// `admin`, `instructor` or `learner`
    pub role: String,
    pub is_bootstrap: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.public_id,
            email: value.email,
            name: value.name,
            role: value.role.to_string(),
            is_bootstrap: value.is_bootstrap,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub duration_minutes: i64,
    pub category: String,
    pub instructor: String,
    pub image_url: String,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Course> for CourseResponse {
    fn from(value: Course) -> Self {
        Self {
            id: value.public_id,
            title: value.title,
            description: value.description,
            price_cents: value.price_cents,
            duration_minutes: value.duration_minutes,
            category: value.category.to_string(),
            instructor: value.instructor,
            image_url: value.image_url,
            is_published: value.is_published,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummaryResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub duration_minutes: i64,
    pub instructor: String,
    pub price_cents: i64,
}

impl From<CourseSummary> for CourseSummaryResponse {
    fn from(value: CourseSummary) -> Self {
        Self {
            id: value.public_id,
            title: value.title,
            description: value.description,
            image_url: value.image_url,
            duration_minutes: value.duration_minutes,
            instructor: value.instructor,
            price_cents: value.price_cents,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub is_paid: bool,
    pub is_enabled: bool,
    pub progress: i64,
    pub completed: bool,
    pub enrolled_at: String,
    pub paid_at: Option<String>,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseSummaryResponse>,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(value: Enrollment) -> Self {
        Self {
            id: value.public_id,
            user_id: value.user_public_id,
            course_id: value.course_public_id,
            is_paid: value.is_paid,
            is_enabled: value.is_enabled,
            progress: value.progress,
            completed: value.completed,
            enrolled_at: value.enrolled_at,
            paid_at: value.paid_at,
            updated_at: value.updated_at,
            course: None,
        }
    }
}

impl From<EnrollmentWithCourse> for EnrollmentResponse {
    fn from(value: EnrollmentWithCourse) -> Self {
        Self {
            course: Some(value.course.into()),
            ..value.enrollment.into()
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseContentResponse {
    pub enrollment_id: String,
    pub course_id: String,
    pub title: String,
    pub video_url: String,
    pub notes_url: String,
    pub correction_url: String,
}

impl From<CourseContent> for CourseContentResponse {
    fn from(value: CourseContent) -> Self {
        Self {
            enrollment_id: value.enrollment_id,
            course_id: value.course_id,
            title: value.title,
            video_url: value.video_url,
            notes_url: value.notes_url,
            correction_url: value.correction_url,
        }
    }
}

/// One row of a course roster in the admin console.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub enrollment_id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub is_paid: bool,
    pub is_enabled: bool,
    pub progress: i64,
    pub enrolled_at: String,
    /// Present once a payment has been recorded for the enrollment.
    pub payment: Option<PaymentResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub confirmation_id: String,
    pub amount_cents: i64,
    pub provider: String,
    pub confirmed_at: String,
}

impl From<Payment> for PaymentResponse {
    fn from(value: Payment) -> Self {
        Self {
            confirmation_id: value.confirmation_id,
            amount_cents: value.amount_cents,
            provider: value.provider,
            confirmed_at: value.confirmed_at,
        }
    }
}

impl From<RosterEntry> for StudentResponse {
    fn from(entry: RosterEntry) -> Self {
        let value = entry.student;
        Self {
            enrollment_id: value.enrollment.public_id,
            user_id: value.enrollment.user_public_id,
            name: value.student_name,
            email: value.student_email,
            is_paid: value.enrollment.is_paid,
            is_enabled: value.enrollment.is_enabled,
            progress: value.enrollment.progress,
            enrolled_at: value.enrollment.enrolled_at,
            payment: entry.payment.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRosterResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub students: Vec<StudentResponse>,
}

impl From<CourseWithStudents> for CourseRosterResponse {
    fn from(value: CourseWithStudents) -> Self {
        Self {
            course: value.course.into(),
            students: value.students.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: i64,
    pub admins: i64,
    pub instructors: i64,
    pub learners: i64,
    pub total_courses: i64,
    pub published_courses: i64,
    pub total_students: i64,
    pub paid_enrollments: i64,
    pub enabled_enrollments: i64,
    pub recorded_payments: i64,
    pub revenue_cents: i64,
}

impl From<PlatformStats> for StatsResponse {
    fn from(value: PlatformStats) -> Self {
        Self {
            total_users: value.total_users,
            admins: value.admins,
            instructors: value.instructors,
            learners: value.learners,
            total_courses: value.total_courses,
            published_courses: value.published_courses,
            total_students: value.total_students,
            paid_enrollments: value.paid_enrollments,
            enabled_enrollments: value.enabled_enrollments,
            recorded_payments: value.recorded_payments,
            revenue_cents: value.revenue_cents,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentEnvelope {
    pub enrollment: EnrollmentResponse,
}

impl From<Enrollment> for EnrollmentEnvelope {
    fn from(value: Enrollment) -> Self {
        Self {
            enrollment: value.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseEnvelope {
    pub course: CourseResponse,
}

impl From<Course> for CourseEnvelope {
    fn from(value: Course) -> Self {
        Self {
            course: value.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

impl From<User> for UserEnvelope {
    fn from(value: User) -> Self {
        Self { user: value.into() }
    }
}
