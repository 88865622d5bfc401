pub mod admin;
pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod health;
pub mod models;
pub mod payments;
pub mod users;
