//! Database repository implementations

pub mod course_repository;
pub mod enrollment_repository;
pub mod payment_repository;
pub mod user_repository;

pub use course_repository::CourseRepository;
pub use enrollment_repository::{EnrollmentRepository, LedgerStats};
pub use payment_repository::PaymentRepository;
pub use user_repository::UserRepository;
