//! The enrollment workflow: enroll, pay, enable, learn.

use std::sync::Arc;

use coursehub_database::{
    Course, CourseRepository, Enrollment, EnrollmentRepository, EnrollmentWithCourse,
    PaymentConfirmation, PaymentOutcome, User, UserRepository,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::payments::{ChargeRequest, PaymentGateway};
use crate::policy::{self, Capability};

/// Course material unlocked once an enrollment is paid and enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseContent {
    pub enrollment_id: String,
    pub course_id: String,
    pub title: String,
    pub video_url: String,
    pub notes_url: String,
    pub correction_url: String,
}

#[derive(Clone)]
pub struct EnrollmentWorkflow {
    users: UserRepository,
    courses: CourseRepository,
    enrollments: EnrollmentRepository,
    gateway: Arc<dyn PaymentGateway>,
}

impl EnrollmentWorkflow {
    pub fn new(pool: SqlitePool, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            courses: CourseRepository::new(pool.clone()),
            enrollments: EnrollmentRepository::new(pool),
            gateway,
        }
    }

    /// Enroll a learner in a course. Learners may only enroll themselves,
    /// and only in published courses.
    pub async fn enroll(
        &self,
        actor: &User,
        user_public_id: &str,
        course_public_id: &str,
    ) -> CatalogResult<Enrollment> {
        let user_public_id = user_public_id.trim();
        let course_public_id = course_public_id.trim();
        if user_public_id.is_empty() || course_public_id.is_empty() {
            return Err(CatalogError::validation("User ID and Course ID are required"));
        }
        if actor.public_id != user_public_id {
            policy::require(actor, Capability::Admin)?;
        }

        let learner = self
            .users
            .find_by_public_id(user_public_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("User not found"))?;
        let course = self
            .courses
            .find_by_public_id(course_public_id)
            .await?
            .filter(|course| course.is_published || actor.is_admin())
            .ok_or_else(|| CatalogError::not_found("Course not found"))?;

        let enrollment = self
            .enrollments
            .enroll(learner.id, course.id)
            .await
            .map_err(|err| match CatalogError::from(err) {
                CatalogError::Conflict(_) => {
                    CatalogError::conflict("User is already enrolled in this course")
                }
                other => other,
            })?;

        info!(
            enrollment = %enrollment.public_id,
            user = %learner.public_id,
            course = %course.public_id,
            "learner enrolled"
        );
        Ok(enrollment)
    }

    /// A learner's enrollments with course summaries, newest first.
    pub async fn list_for_user(
        &self,
        actor: &User,
        user_public_id: &str,
    ) -> CatalogResult<Vec<EnrollmentWithCourse>> {
        let user_public_id = user_public_id.trim();
        if user_public_id.is_empty() {
            return Err(CatalogError::validation("User ID is required"));
        }
        if actor.public_id != user_public_id {
            policy::require(actor, Capability::Admin)?;
        }

        let learner = self
            .users
            .find_by_public_id(user_public_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("User not found"))?;
        Ok(self.enrollments.list_for_user(learner.id).await?)
    }

    /// Public ids of the courses the user is enrolled in.
    pub async fn enrolled_course_ids(&self, user: &User) -> CatalogResult<Vec<String>> {
        Ok(self.enrollments.course_public_ids_for_user(user.id).await?)
    }

    /// Charge the course price through the configured gateway and apply the
    /// resulting confirmation. Paying a paid enrollment changes nothing.
    pub async fn pay(&self, actor: &User, enrollment_public_id: &str) -> CatalogResult<Enrollment> {
        let enrollment = self.find(enrollment_public_id).await?;
        policy::require_owner_or_admin(actor, enrollment.user_id)?;

        if enrollment.is_paid {
            return Ok(enrollment);
        }

        let course = self.course_of(&enrollment).await?;
        let receipt = self
            .gateway
            .charge(&ChargeRequest {
                enrollment_public_id: enrollment.public_id.clone(),
                amount_cents: course.price_cents,
            })
            .await?;

        let outcome = self
            .apply(
                &enrollment,
                &course,
                PaymentConfirmation {
                    confirmation_id: receipt.confirmation_id,
                    amount_cents: receipt.amount_cents,
                    provider: receipt.provider,
                },
            )
            .await?;
        Ok(outcome.into_enrollment())
    }

    /// Apply a provider confirmation. Safe under at-least-once delivery.
    pub async fn confirm_payment(
        &self,
        enrollment_public_id: &str,
        confirmation_id: &str,
        amount_cents: i64,
        provider: &str,
    ) -> CatalogResult<PaymentOutcome> {
        let enrollment = self.find(enrollment_public_id).await?;
        let course = self.course_of(&enrollment).await?;
        self.apply(
            &enrollment,
            &course,
            PaymentConfirmation {
                confirmation_id: confirmation_id.to_string(),
                amount_cents,
                provider: provider.to_string(),
            },
        )
        .await
    }

    async fn apply(
        &self,
        enrollment: &Enrollment,
        course: &Course,
        confirmation: PaymentConfirmation,
    ) -> CatalogResult<PaymentOutcome> {
        if confirmation.confirmation_id.trim().is_empty() {
            return Err(CatalogError::validation("Confirmation ID is required"));
        }
        if confirmation.amount_cents != course.price_cents {
            warn!(
                enrollment = %enrollment.public_id,
                expected = course.price_cents,
                received = confirmation.amount_cents,
                "payment amount mismatch"
            );
            return Err(CatalogError::validation(
                "Payment amount does not match the course price",
            ));
        }

        let outcome = self
            .enrollments
            .confirm_payment(enrollment.id, &confirmation)
            .await?;

        if outcome.was_applied() {
            info!(
                enrollment = %enrollment.public_id,
                confirmation = %confirmation.confirmation_id,
                provider = %confirmation.provider,
                "payment confirmed"
            );
        } else {
            info!(
                enrollment = %enrollment.public_id,
                confirmation = %confirmation.confirmation_id,
                "payment confirmation replayed"
            );
        }
        Ok(outcome)
    }

    /// Grant or revoke access. Access can only be granted once paid.
    pub async fn set_access(
        &self,
        actor: &User,
        enrollment_public_id: &str,
        enabled: bool,
    ) -> CatalogResult<Enrollment> {
        policy::require(actor, Capability::Admin)?;
        let enrollment = self.find(enrollment_public_id).await?;

        if enabled && !enrollment.is_paid {
            return Err(CatalogError::validation(
                "Enrollment must be paid before access can be enabled",
            ));
        }
        if enrollment.is_enabled == enabled {
            return Ok(enrollment);
        }

        let updated = self.enrollments.set_access(enrollment.id, enabled).await?;
        info!(enrollment = %updated.public_id, enabled, actor = %actor.public_id, "access changed");
        Ok(updated)
    }

    pub async fn update_progress(
        &self,
        actor: &User,
        enrollment_public_id: &str,
        progress: i64,
    ) -> CatalogResult<Enrollment> {
        let enrollment = self.find(enrollment_public_id).await?;
        policy::require_owner(actor, enrollment.user_id)?;

        if !(0..=100).contains(&progress) {
            return Err(CatalogError::validation("Progress must be between 0 and 100"));
        }
        if !enrollment.has_access() {
            return Err(CatalogError::forbidden("Course access has not been enabled"));
        }

        Ok(self.enrollments.update_progress(enrollment.id, progress).await?)
    }

    pub async fn course_content(
        &self,
        actor: &User,
        enrollment_public_id: &str,
    ) -> CatalogResult<CourseContent> {
        let enrollment = self.find(enrollment_public_id).await?;
        policy::require_owner(actor, enrollment.user_id)?;

        if !enrollment.has_access() {
            return Err(CatalogError::forbidden("Course access has not been enabled"));
        }

        let course = self.course_of(&enrollment).await?;
        Ok(CourseContent {
            enrollment_id: enrollment.public_id,
            course_id: course.public_id,
            title: course.title,
            video_url: course.video_url,
            notes_url: course.notes_url,
            correction_url: course.correction_url,
        })
    }

    async fn find(&self, public_id: &str) -> CatalogResult<Enrollment> {
        self.enrollments
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Enrollment not found"))
    }

    async fn course_of(&self, enrollment: &Enrollment) -> CatalogResult<Course> {
        self.courses
            .find_by_id(enrollment.course_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Course not found"))
    }
}
