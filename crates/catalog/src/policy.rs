//! Capability checks applied before every catalog operation.

use coursehub_database::{User, UserRole};

use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Admin,
    Instructor,
    Learner,
}

impl Capability {
    fn as_str(&self) -> &'static str {
        match self {
            Capability::Admin => "admin",
            Capability::Instructor => "instructor",
            Capability::Learner => "learner",
        }
    }
}

/// Whether a role carries the capability. Admin implies every capability.
pub fn grants(role: UserRole, capability: Capability) -> bool {
    match role {
        UserRole::Admin => true,
        UserRole::Instructor => matches!(capability, Capability::Instructor | Capability::Learner),
        UserRole::Learner => capability == Capability::Learner,
    }
}

pub fn require(actor: &User, capability: Capability) -> CatalogResult<()> {
    if grants(actor.role, capability) {
        Ok(())
    } else {
        Err(CatalogError::forbidden(format!(
            "{} access required",
            capability.as_str()
        )))
    }
}

/// The actor must be the user identified by `owner_id`, or an admin.
pub fn require_owner_or_admin(actor: &User, owner_id: i64) -> CatalogResult<()> {
    if actor.id == owner_id || actor.is_admin() {
        Ok(())
    } else {
        Err(CatalogError::forbidden("Access denied"))
    }
}

/// The actor must be the user identified by `owner_id`.
pub fn require_owner(actor: &User, owner_id: i64) -> CatalogResult<()> {
    if actor.id == owner_id {
        Ok(())
    } else {
        Err(CatalogError::forbidden("Access denied"))
    }
}
