//! Domain entities for the database layer

pub mod course;
pub mod enrollment;
pub mod payment;
pub mod user;

pub use course::{Category, Course, CourseFilter, NewCourse, UnknownCategory};
pub use enrollment::{
    CourseSummary, Enrollment, EnrollmentWithCourse, PaymentOutcome, StudentEnrollment,
};
pub use payment::{Payment, PaymentConfirmation};
pub use user::{NewUser, UnknownRole, UpdateProfile, User, UserRole};
