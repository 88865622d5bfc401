//! # CourseHub Catalog Crate
//!
//! Business logic behind the marketplace: the public catalog, the
//! enrollment workflow (enroll, pay, enable), the payment gateway seam and
//! admin user management. Every operation checks the caller's
//! [`Capability`] before touching the store.

pub mod admin;
pub mod catalog;
pub mod enrollment;
pub mod error;
pub mod payments;
pub mod policy;

pub use admin::UserAdmin;
pub use catalog::{
    AdminOverview, CatalogService, CourseInput, CourseWithStudents, PlatformStats,
    RosterEntry,
};
pub use enrollment::{CourseContent, EnrollmentWorkflow};
pub use error::{CatalogError, CatalogResult};
pub use payments::{
    gateway_from_config, ChargeReceipt, ChargeRequest, PaymentGateway, SimulatedGateway,
    WebhookVerifier, SIGNATURE_HEADER, SIMULATED_PROVIDER,
};
pub use policy::Capability;
