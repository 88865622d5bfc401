//! CourseHub Database Crate
//!
//! Connection management, embedded migrations and the repositories for the
//! credential store, the course catalog and the enrollment ledger.

use coursehub_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use repos::{
    CourseRepository, EnrollmentRepository, LedgerStats, PaymentRepository, UserRepository,
};

pub use entities::{
    Category, Course, CourseFilter, CourseSummary, Enrollment, EnrollmentWithCourse, NewCourse,
    NewUser, Payment, PaymentConfirmation, PaymentOutcome, StudentEnrollment, UnknownCategory,
    UnknownRole, UpdateProfile, User, UserRole,
};

pub use types::{errors::DatabaseError, DatabaseResult};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}
