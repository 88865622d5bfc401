//! Shared types and result types for the database layer

pub mod errors;

pub use errors::{
    is_check_violation, is_foreign_key_violation, is_unique_violation, DatabaseError,
};

pub type DatabaseResult<T> = Result<T, DatabaseError>;

use chrono::{SecondsFormat, Utc};
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

/// Opaque identifier exposed over the API in place of row ids.
pub fn new_public_id() -> String {
    CUID.create_id()
}

/// RFC 3339 timestamp with fixed microsecond precision so stored values
/// sort lexically in time order.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
