use std::sync::Arc;

use anyhow::{Context, Result};
use coursehub_auth::{Authenticator, BootstrapOutcome};
use coursehub_catalog::{gateway_from_config, CatalogService, PaymentGateway, WebhookVerifier};
use coursehub_config::AppConfig;
use coursehub_database::{initialize_database, User};
use sqlx::SqlitePool;
use tracing::{info, warn};

pub mod seed;

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub catalog: CatalogService,
    pub gateway: Arc<dyn PaymentGateway>,
    /// `None` disables the payment confirmation webhook.
    pub webhook: Option<WebhookVerifier>,
    pub bootstrap_admin: Option<User>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        if config.auth.uses_default_secret() {
            warn!("auth.jwt_secret is the built-in development secret; set COURSEHUB__AUTH__JWT_SECRET");
        }
        let authenticator = Authenticator::new(db_pool.clone(), &config.auth);

        let bootstrap_admin = match authenticator
            .ensure_bootstrap_admin(&config.bootstrap)
            .await
            .context("failed to seed bootstrap administrator")?
        {
            BootstrapOutcome::Existing(user) => Some(user),
            BootstrapOutcome::Created {
                user,
                generated_password,
            } => {
                if let Some(password) = generated_password {
                    warn!(
                        email = %user.email,
                        password = %password,
                        "bootstrap administrator created with a generated password; set bootstrap.admin_password to choose one"
                    );
                }
                Some(user)
            }
            BootstrapOutcome::EmailTaken(user) => {
                warn!(
                    email = %user.email,
                    "bootstrap admin email belongs to an existing account; no bootstrap administrator seeded"
                );
                None
            }
        };

        let gateway = gateway_from_config(&config.payments);
        let webhook = WebhookVerifier::from_config(&config.payments);
        if webhook.is_none() {
            info!("payments.webhook_secret unset; payment confirmation webhook disabled");
        }
        info!(provider = gateway.provider(), "payment gateway ready");

        Ok(Self {
            catalog: CatalogService::new(db_pool.clone()),
            db_pool,
            authenticator,
            gateway,
            webhook,
            bootstrap_admin,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
