//! Course catalog: public listing, course creation and publication, and
//! the admin overview.

use coursehub_database::{
    Category, Course, CourseFilter, CourseRepository, EnrollmentRepository, NewCourse, Payment,
    PaymentRepository, StudentEnrollment, User, UserRepository, UserRole,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{CatalogError, CatalogResult};
use crate::policy::{self, Capability};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Raw course fields as submitted by an admin.
#[derive(Debug, Clone, Default)]
pub struct CourseInput {
    pub title: String,
    pub description: String,
    pub price_cents: Option<i64>,
    pub duration_minutes: Option<i64>,
    pub category: String,
    pub instructor: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub notes_url: Option<String>,
    pub correction_url: Option<String>,
}

impl CourseInput {
    /// Check required fields and limits. New courses start unpublished.
    pub fn validate(self) -> CatalogResult<NewCourse> {
        let title = self.title.trim().to_string();
        let description = self.description.trim().to_string();
        let instructor = self.instructor.trim().to_string();
        let category = self.category.trim();

        let (Some(price_cents), Some(duration_minutes)) = (self.price_cents, self.duration_minutes)
        else {
            return Err(CatalogError::validation("Missing required fields"));
        };
        if title.is_empty() || description.is_empty() || instructor.is_empty() || category.is_empty()
        {
            return Err(CatalogError::validation("Missing required fields"));
        }

        if title.chars().count() > MAX_TITLE_LEN {
            return Err(CatalogError::validation(format!(
                "Title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(CatalogError::validation(format!(
                "Description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        if price_cents < 0 {
            return Err(CatalogError::validation("Price cannot be negative"));
        }
        if duration_minutes < 1 {
            return Err(CatalogError::validation("Duration must be at least 1 minute"));
        }
        let category: Category = category
            .parse()
            .map_err(|err: coursehub_database::UnknownCategory| CatalogError::validation(err.to_string()))?;

        Ok(NewCourse {
            title,
            description,
            price_cents,
            duration_minutes,
            category,
            instructor,
            image_url: trimmed_or_empty(self.image_url),
            video_url: trimmed_or_empty(self.video_url),
            notes_url: trimmed_or_empty(self.notes_url),
            correction_url: trimmed_or_empty(self.correction_url),
            is_published: false,
        })
    }
}

fn trimmed_or_empty(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// One roster row: the enrollment and, once paid, the recorded payment.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student: StudentEnrollment,
    pub payment: Option<Payment>,
}

/// A course with its roster, as shown in the admin console.
#[derive(Debug, Clone, Serialize)]
pub struct CourseWithStudents {
    pub course: Course,
    pub students: Vec<RosterEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
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

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub courses: Vec<CourseWithStudents>,
    pub stats: PlatformStats,
}

#[derive(Clone)]
pub struct CatalogService {
    courses: CourseRepository,
    enrollments: EnrollmentRepository,
    payments: PaymentRepository,
    users: UserRepository,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            courses: CourseRepository::new(pool.clone()),
            enrollments: EnrollmentRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// Published courses, newest first.
    pub async fn list_published(&self, filter: &CourseFilter) -> CatalogResult<Vec<Course>> {
        Ok(self.courses.list_published(filter).await?)
    }

    pub async fn create_course(&self, actor: &User, input: CourseInput) -> CatalogResult<Course> {
        policy::require(actor, Capability::Admin)?;
        let request = input.validate()?;
        let course = self.courses.create(&request).await?;
        info!(course = %course.public_id, actor = %actor.public_id, "course created");
        Ok(course)
    }

    /// A single course. Unpublished courses are visible to admins only.
    pub async fn get_course(&self, actor: Option<&User>, public_id: &str) -> CatalogResult<Course> {
        let course = self
            .courses
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Course not found"))?;

        let admin = actor.is_some_and(User::is_admin);
        if !course.is_published && !admin {
            return Err(CatalogError::not_found("Course not found"));
        }
        Ok(course)
    }

    pub async fn set_published(
        &self,
        actor: &User,
        public_id: &str,
        published: bool,
    ) -> CatalogResult<Course> {
        policy::require(actor, Capability::Admin)?;
        let course = self
            .courses
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Course not found"))?;

        let updated = self.courses.set_published(course.id, published).await?;
        info!(course = %updated.public_id, published, "course publication changed");
        Ok(updated)
    }

    /// Every course with its roster, plus platform totals.
    pub async fn admin_overview(&self, actor: &User) -> CatalogResult<AdminOverview> {
        policy::require(actor, Capability::Admin)?;

        let all = self.courses.list_all().await?;
        let mut courses = Vec::with_capacity(all.len());
        for course in all {
            let roster = self.enrollments.list_for_course(course.id).await?;
            let mut students = Vec::with_capacity(roster.len());
            for student in roster {
                let payment = if student.enrollment.is_paid {
                    self.payments.find_by_enrollment(student.enrollment.id).await?
                } else {
                    None
                };
                students.push(RosterEntry { student, payment });
            }
            courses.push(CourseWithStudents { course, students });
        }

        let role_counts = self.users.count_by_role().await?;
        let count_of = |role: UserRole| {
            role_counts
                .iter()
                .find(|(r, _)| *r == role)
                .map(|(_, count)| *count)
                .unwrap_or(0)
        };
        let ledger = self.enrollments.stats().await?;
        let recorded_payments = self.payments.count().await?;

        let stats = PlatformStats {
            total_users: role_counts.iter().map(|(_, count)| count).sum(),
            admins: count_of(UserRole::Admin),
            instructors: count_of(UserRole::Instructor),
            learners: count_of(UserRole::Learner),
            total_courses: courses.len() as i64,
            published_courses: courses.iter().filter(|c| c.course.is_published).count() as i64,
            total_students: ledger.enrollments,
            paid_enrollments: ledger.paid,
            enabled_enrollments: ledger.enabled,
            recorded_payments,
            revenue_cents: ledger.revenue_cents,
        };

        Ok(AdminOverview { courses, stats })
    }
}
