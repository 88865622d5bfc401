//! Payment confirmation records

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub enrollment_id: i64,
    pub confirmation_id: String,
    pub amount_cents: i64,
    pub provider: String,
    pub confirmed_at: String,
}

/// A confirmation delivered by a payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub confirmation_id: String,
    pub amount_cents: i64,
    pub provider: String,
}
