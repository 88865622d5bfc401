//! Enrollment ledger entities

use serde::Serialize;
use sqlx::{sqlite::SqliteRow, FromRow, Row};

/// A (learner, course) ledger record with its payment and access flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enrollment {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub user_public_id: String,
    #[serde(skip_serializing)]
    pub course_id: i64,
    pub course_public_id: String,
    pub is_paid: bool,
    pub is_enabled: bool,
    pub progress: i64,
    pub completed: bool,
    pub enrolled_at: String,
    pub paid_at: Option<String>,
    pub updated_at: String,
}

impl Enrollment {
    /// Paid and enabled: the learner may retrieve course content.
    pub fn has_access(&self) -> bool {
        self.is_paid && self.is_enabled
    }
}

impl<'r> FromRow<'r, SqliteRow> for Enrollment {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            public_id: row.try_get("public_id")?,
            user_id: row.try_get("user_id")?,
            user_public_id: row.try_get("user_public_id")?,
            course_id: row.try_get("course_id")?,
            course_public_id: row.try_get("course_public_id")?,
            is_paid: row.try_get("is_paid")?,
            is_enabled: row.try_get("is_enabled")?,
            progress: row.try_get("progress")?,
            completed: row.try_get("completed")?,
            enrolled_at: row.try_get("enrolled_at")?,
            paid_at: row.try_get("paid_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// The course fields shown next to a learner's enrollment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub public_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub duration_minutes: i64,
    pub instructor: String,
    pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentWithCourse {
    pub enrollment: Enrollment,
    pub course: CourseSummary,
}

impl<'r> FromRow<'r, SqliteRow> for EnrollmentWithCourse {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            enrollment: Enrollment::from_row(row)?,
            course: CourseSummary {
                public_id: row.try_get("course_public_id")?,
                title: row.try_get("course_title")?,
                description: row.try_get("course_description")?,
                image_url: row.try_get("course_image_url")?,
                duration_minutes: row.try_get("course_duration_minutes")?,
                instructor: row.try_get("course_instructor")?,
                price_cents: row.try_get("course_price_cents")?,
            },
        })
    }
}

/// An enrollment as seen from the admin console's course roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentEnrollment {
    pub enrollment: Enrollment,
    pub student_name: String,
    pub student_email: String,
}

impl<'r> FromRow<'r, SqliteRow> for StudentEnrollment {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            enrollment: Enrollment::from_row(row)?,
            student_name: row.try_get("student_name")?,
            student_email: row.try_get("student_email")?,
        })
    }
}

/// Outcome of applying a payment confirmation to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// The confirmation was new and flipped `is_paid`.
    Applied(Enrollment),
    /// The enrollment was already paid; nothing changed.
    AlreadyPaid(Enrollment),
}

impl PaymentOutcome {
    pub fn enrollment(&self) -> &Enrollment {
        match self {
            PaymentOutcome::Applied(enrollment) | PaymentOutcome::AlreadyPaid(enrollment) => {
                enrollment
            }
        }
    }

    pub fn into_enrollment(self) -> Enrollment {
        match self {
            PaymentOutcome::Applied(enrollment) | PaymentOutcome::AlreadyPaid(enrollment) => {
                enrollment
            }
        }
    }

    pub fn was_applied(&self) -> bool {
        matches!(self, PaymentOutcome::Applied(_))
    }
}
