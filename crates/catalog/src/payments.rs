//! Payment gateway seam and webhook signature verification.
//!
//! A gateway charges the course price and answers with a provider
//! confirmation id. Providers that confirm asynchronously call back through
//! the signed webhook instead; both paths end in
//! [`crate::EnrollmentWorkflow::confirm_payment`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coursehub_config::{PaymentProvider, PaymentsConfig};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};

type HmacSha256 = Hmac<Sha256>;

pub const SIMULATED_PROVIDER: &str = "simulated";

/// Header carrying `hex(HMAC-SHA256(secret, raw body))` on webhook calls.
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub enrollment_public_id: String,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeReceipt {
    pub confirmation_id: String,
    pub amount_cents: i64,
    pub provider: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Provider name recorded alongside each payment.
    fn provider(&self) -> &str;

    async fn charge(&self, request: &ChargeRequest) -> CatalogResult<ChargeReceipt>;
}

/// Stand-in provider: waits a fixed delay and always succeeds. The
/// confirmation id is derived from the enrollment, so a repeated charge
/// replays the same confirmation.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn confirmation_id_for(enrollment_public_id: &str) -> String {
        format!("sim_{enrollment_public_id}")
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    fn provider(&self) -> &str {
        SIMULATED_PROVIDER
    }

    async fn charge(&self, request: &ChargeRequest) -> CatalogResult<ChargeReceipt> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        debug!(enrollment = %request.enrollment_public_id, amount = request.amount_cents, "simulated charge");
        Ok(ChargeReceipt {
            confirmation_id: Self::confirmation_id_for(&request.enrollment_public_id),
            amount_cents: request.amount_cents,
            provider: SIMULATED_PROVIDER.to_string(),
        })
    }
}

/// Build the gateway selected by configuration.
pub fn gateway_from_config(config: &PaymentsConfig) -> Arc<dyn PaymentGateway> {
    match config.provider {
        PaymentProvider::Simulated => Arc::new(SimulatedGateway::new(Duration::from_millis(
            config.simulated_delay_ms,
        ))),
    }
}

/// Signs and checks webhook bodies with the shared secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Vec<u8>,
}

impl WebhookVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// `None` when no webhook secret is configured or it is blank.
    pub fn from_config(config: &PaymentsConfig) -> Option<Self> {
        config
            .webhook_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .map(Self::new)
    }

    fn mac(&self) -> CatalogResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| CatalogError::PaymentUnavailable("webhook secret is unusable".into()))
    }

    /// Hex-encoded HMAC-SHA256 of the body.
    pub fn sign(&self, body: &[u8]) -> CatalogResult<String> {
        let mut mac = self.mac()?;
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time check of a hex signature against the body.
    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        let Ok(provided) = hex::decode(signature.trim()) else {
            return false;
        };
        let Ok(mut mac) = self.mac() else {
            return false;
        };
        mac.update(body);
        mac.verify_slice(&provided).is_ok()
    }
}
