//! Admin console user management.

use coursehub_auth::Authenticator;
use coursehub_database::{User, UserRepository, UserRole};
use tracing::info;

use crate::error::{CatalogError, CatalogResult};
use crate::policy::{self, Capability};

#[derive(Clone)]
pub struct UserAdmin {
    authenticator: Authenticator,
}

impl UserAdmin {
    pub fn new(authenticator: Authenticator) -> Self {
        Self { authenticator }
    }

    fn users(&self) -> &UserRepository {
        self.authenticator.users()
    }

    /// All users, oldest first.
    pub async fn list_users(&self, actor: &User) -> CatalogResult<Vec<User>> {
        policy::require(actor, Capability::Admin)?;
        Ok(self.users().list().await?)
    }

    /// Create an account with an explicit role from the admin console.
    pub async fn create_user(
        &self,
        actor: &User,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
    ) -> CatalogResult<User> {
        policy::require(actor, Capability::Admin)?;
        let user = self
            .authenticator
            .create_user(email, password, name, role)
            .await?;
        info!(user = %user.public_id, role = %user.role, actor = %actor.public_id, "user created by admin");
        Ok(user)
    }

    pub async fn change_role(
        &self,
        actor: &User,
        target_public_id: &str,
        role: UserRole,
    ) -> CatalogResult<User> {
        policy::require(actor, Capability::Admin)?;
        let target = self.protected_target(target_public_id).await?;

        let updated = self.users().update_role(target.id, role).await?;
        info!(user = %updated.public_id, role = %updated.role, actor = %actor.public_id, "role changed");
        Ok(updated)
    }

    /// Hard-delete a user; enrollments and payments cascade.
    pub async fn remove_user(&self, actor: &User, target_public_id: &str) -> CatalogResult<()> {
        policy::require(actor, Capability::Admin)?;
        let target = self.protected_target(target_public_id).await?;

        self.users().delete(target.id).await?;
        info!(user = %target.public_id, actor = %actor.public_id, "user removed");
        Ok(())
    }

    async fn protected_target(&self, public_id: &str) -> CatalogResult<User> {
        let target = self
            .users()
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("User not found"))?;

        if target.is_bootstrap {
            return Err(CatalogError::forbidden(
                "The bootstrap administrator cannot be modified",
            ));
        }
        Ok(target)
    }
}
