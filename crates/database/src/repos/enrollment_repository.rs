//! Enrollment ledger repository.
//!
//! An enrollment spans three stores: the `enrollments` row, the learner's
//! `user_courses` set and the course's `course_students` set. Writes that
//! touch more than one of them run in a single transaction.

use crate::entities::{
    Enrollment, EnrollmentWithCourse, PaymentConfirmation, PaymentOutcome, StudentEnrollment,
};
use crate::types::{
    is_check_violation, is_foreign_key_violation, is_unique_violation, new_public_id,
    timestamp_now, DatabaseError, DatabaseResult,
};
use sqlx::SqlitePool;
use tracing::debug;

const ENROLLMENT_SELECT: &str = "SELECT e.id, e.public_id, e.user_id, u.public_id AS user_public_id, \
     e.course_id, c.public_id AS course_public_id, e.is_paid, e.is_enabled, e.progress, e.completed, \
     e.enrolled_at, e.paid_at, e.updated_at";

const ENROLLMENT_FROM: &str =
    "FROM enrollments e JOIN users u ON u.id = e.user_id JOIN courses c ON c.id = e.course_id";

/// Aggregates over the whole ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub enrollments: i64,
    pub paid: i64,
    pub enabled: i64,
    pub revenue_cents: i64,
}

/// Repository for enrollment database operations
#[derive(Clone)]
pub struct EnrollmentRepository {
    pool: SqlitePool,
}

impl EnrollmentRepository {
    /// Create a new enrollment repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a new unpaid, disabled enrollment and add the pair to both
    /// membership sets. Fails with `Duplicate` if the pair already exists.
    pub async fn enroll(&self, user_id: i64, course_id: i64) -> DatabaseResult<Enrollment> {
        let now = timestamp_now();
        let mut tx = self.pool.begin().await?;

        let (enrollment_id,): (i64,) = sqlx::query_as(
            "INSERT INTO enrollments (public_id, user_id, course_id, is_paid, is_enabled, progress, completed, enrolled_at, updated_at) \
             VALUES (?, ?, ?, 0, 0, 0, 0, ?, ?) RETURNING id",
        )
        .bind(new_public_id())
        .bind(user_id)
        .bind(course_id)
        .bind(&now)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                DatabaseError::duplicate("already enrolled in this course")
            } else if is_foreign_key_violation(&err) {
                DatabaseError::not_found("user or course")
            } else {
                DatabaseError::from(err)
            }
        })?;

        sqlx::query("INSERT OR IGNORE INTO user_courses (user_id, course_id, added_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(course_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT OR IGNORE INTO course_students (course_id, user_id, added_at) VALUES (?, ?, ?)")
            .bind(course_id)
            .bind(user_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "{ENROLLMENT_SELECT} {ENROLLMENT_FROM} WHERE e.id = ?"
        ))
        .bind(enrollment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(enrollment = %enrollment.public_id, "enrollment recorded");
        Ok(enrollment)
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Enrollment>> {
        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "{ENROLLMENT_SELECT} {ENROLLMENT_FROM} WHERE e.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(enrollment)
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<Enrollment>> {
        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "{ENROLLMENT_SELECT} {ENROLLMENT_FROM} WHERE e.public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(enrollment)
    }

    /// A learner's enrollments with course summaries, most recent first.
    pub async fn list_for_user(&self, user_id: i64) -> DatabaseResult<Vec<EnrollmentWithCourse>> {
        let rows = sqlx::query_as::<_, EnrollmentWithCourse>(&format!(
            "{ENROLLMENT_SELECT}, c.title AS course_title, c.description AS course_description, \
             c.image_url AS course_image_url, c.duration_minutes AS course_duration_minutes, \
             c.instructor AS course_instructor, c.price_cents AS course_price_cents \
             {ENROLLMENT_FROM} WHERE e.user_id = ? ORDER BY e.enrolled_at DESC, e.id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// A course's roster with student names, in enrollment order.
    pub async fn list_for_course(&self, course_id: i64) -> DatabaseResult<Vec<StudentEnrollment>> {
        let rows = sqlx::query_as::<_, StudentEnrollment>(&format!(
            "{ENROLLMENT_SELECT}, u.name AS student_name, u.email AS student_email \
             {ENROLLMENT_FROM} WHERE e.course_id = ? ORDER BY e.enrolled_at ASC, e.id ASC"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Public ids of the courses in a learner's enrolled-course set.
    pub async fn course_public_ids_for_user(&self, user_id: i64) -> DatabaseResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT c.public_id FROM user_courses uc JOIN courses c ON c.id = uc.course_id \
             WHERE uc.user_id = ? ORDER BY uc.added_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Apply a provider confirmation to an enrollment.
    ///
    /// Replays of a confirmation already applied to this enrollment, and
    /// confirmations for an enrollment that is already paid, leave the
    /// ledger unchanged. A confirmation id already bound to a different
    /// enrollment is rejected with `Duplicate`.
    pub async fn confirm_payment(
        &self,
        enrollment_id: i64,
        confirmation: &PaymentConfirmation,
    ) -> DatabaseResult<PaymentOutcome> {
        let now = timestamp_now();
        let mut tx = self.pool.begin().await?;

        // Writing first takes the database write lock before anything is read.
        let flipped = sqlx::query(
            "UPDATE enrollments SET is_paid = 1, paid_at = ?, updated_at = ? WHERE id = ? AND is_paid = 0",
        )
        .bind(&now)
        .bind(&now)
        .bind(enrollment_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if flipped == 1 {
            sqlx::query(
                "INSERT INTO payments (enrollment_id, confirmation_id, amount_cents, provider, confirmed_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(enrollment_id)
            .bind(&confirmation.confirmation_id)
            .bind(confirmation.amount_cents)
            .bind(&confirmation.provider)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    DatabaseError::duplicate("confirmation already applied to another enrollment")
                } else {
                    DatabaseError::from(err)
                }
            })?;

            tx.commit().await?;
            let enrollment = self.require(enrollment_id).await?;
            debug!(enrollment = %enrollment.public_id, confirmation = %confirmation.confirmation_id, "payment applied");
            return Ok(PaymentOutcome::Applied(enrollment));
        }

        tx.rollback().await?;

        let enrollment = self.require(enrollment_id).await?;
        let bound_to: Option<(i64,)> =
            sqlx::query_as("SELECT enrollment_id FROM payments WHERE confirmation_id = ?")
                .bind(&confirmation.confirmation_id)
                .fetch_optional(&self.pool)
                .await?;
        match bound_to {
            Some((other,)) if other != enrollment_id => Err(DatabaseError::duplicate(
                "confirmation already applied to another enrollment",
            )),
            _ => Ok(PaymentOutcome::AlreadyPaid(enrollment)),
        }
    }

    /// Set the access flag. Enabling an unpaid enrollment is rejected with
    /// `Constraint`.
    pub async fn set_access(&self, id: i64, enabled: bool) -> DatabaseResult<Enrollment> {
        let result = sqlx::query(
            "UPDATE enrollments SET is_enabled = ?, updated_at = ? WHERE id = ? AND (? = 0 OR is_paid = 1)",
        )
        .bind(enabled)
        .bind(timestamp_now())
        .bind(id)
        .bind(enabled)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_check_violation(&err) {
                DatabaseError::Constraint("enrollment must be paid before access is enabled".into())
            } else {
                DatabaseError::from(err)
            }
        })?;

        if result.rows_affected() == 0 {
            let enrollment = self.require(id).await?;
            if enabled && !enrollment.is_paid {
                return Err(DatabaseError::Constraint(
                    "enrollment must be paid before access is enabled".into(),
                ));
            }
            return Ok(enrollment);
        }
        self.require(id).await
    }

    /// Record progress; reaching 100 marks the enrollment completed.
    pub async fn update_progress(&self, id: i64, progress: i64) -> DatabaseResult<Enrollment> {
        let result = sqlx::query(
            "UPDATE enrollments SET progress = ?, completed = ?, updated_at = ? WHERE id = ?",
        )
        .bind(progress)
        .bind(progress >= 100)
        .bind(timestamp_now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_check_violation(&err) {
                DatabaseError::InvalidValue(format!("progress {progress} is out of range"))
            } else {
                DatabaseError::from(err)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("enrollment {id}")));
        }
        self.require(id).await
    }

    pub async fn stats(&self) -> DatabaseResult<LedgerStats> {
        let (enrollments, paid, enabled, revenue_cents): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(e.is_paid), 0), \
                    COALESCE(SUM(e.is_enabled), 0), \
                    COALESCE(SUM(CASE WHEN e.is_paid = 1 THEN c.price_cents ELSE 0 END), 0) \
             FROM enrollments e JOIN courses c ON c.id = e.course_id",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(LedgerStats {
            enrollments,
            paid,
            enabled,
            revenue_cents,
        })
    }

    async fn require(&self, id: i64) -> DatabaseResult<Enrollment> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("enrollment {id}")))
    }
}
