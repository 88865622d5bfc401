//! Read access to recorded payment confirmations.

use crate::entities::Payment;
use crate::types::DatabaseResult;
use sqlx::SqlitePool;

const PAYMENT_COLUMNS: &str =
    "id, enrollment_id, confirmation_id, amount_cents, provider, confirmed_at";

/// Repository for payment database operations. Payments are written only by
/// [`crate::EnrollmentRepository::confirm_payment`].
#[derive(Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The payment recorded for a paid enrollment.
    pub async fn find_by_enrollment(&self, enrollment_id: i64) -> DatabaseResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE enrollment_id = ?"
        ))
        .bind(enrollment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payment)
    }

    /// Number of recorded payments, one per paid enrollment.
    pub async fn count(&self) -> DatabaseResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
