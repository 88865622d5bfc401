use std::sync::Arc;

use axum::http::HeaderMap;
use coursehub_auth::Authenticator;
use coursehub_catalog::{
    CatalogService, EnrollmentWorkflow, PaymentGateway, UserAdmin, WebhookVerifier,
};
use coursehub_database::User;
use sqlx::SqlitePool;

use crate::util::{bearer_token, require_bearer};
use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    catalog: CatalogService,
    enrollments: EnrollmentWorkflow,
    user_admin: UserAdmin,
    webhook: Option<WebhookVerifier>,
}

impl AppState {
    pub fn new(
        db_pool: SqlitePool,
        authenticator: Authenticator,
        gateway: Arc<dyn PaymentGateway>,
        webhook: Option<WebhookVerifier>,
    ) -> Self {
        Self {
            catalog: CatalogService::new(db_pool.clone()),
            enrollments: EnrollmentWorkflow::new(db_pool.clone(), gateway),
            user_admin: UserAdmin::new(authenticator.clone()),
            authenticator,
            webhook,
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn enrollments(&self) -> &EnrollmentWorkflow {
        &self.enrollments
    }

    pub fn user_admin(&self) -> &UserAdmin {
        &self.user_admin
    }

    pub fn webhook(&self) -> Option<&WebhookVerifier> {
        self.webhook.as_ref()
    }

    /// Resolve the bearer token in `headers` to a user.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<User, ApiError> {
        let token = require_bearer(headers)?;
        self.authenticator
            .authenticate_token(&token)
            .await
            .map_err(ApiError::from)
    }

    /// Like [`AppState::authenticate`] but anonymous callers get `None`.
    pub async fn optional_user(&self, headers: &HeaderMap) -> Result<Option<User>, ApiError> {
        match bearer_token(headers)? {
            Some(token) => Ok(Some(
                self.authenticator
                    .authenticate_token(&token)
                    .await
                    .map_err(ApiError::from)?,
            )),
            None => Ok(None),
        }
    }
}
