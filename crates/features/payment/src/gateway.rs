use crate::error::PaymentError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Parameters of a one-off hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// The parts of a Checkout Session the backend reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// `paid`, `unpaid` or `no_payment_required`.
    #[serde(default)]
    pub payment_status: Option<String>,
    /// Hosted page the browser is redirected to.
    #[serde(default)]
    pub url: Option<String>,
}

impl CheckoutSession {
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}

/// A payment processor that sells the onboarding fee through hosted checkout pages.
#[async_trait]
pub trait PaymentGateway: Debug + Send + Sync {
    /// # Errors
    ///
    /// Returns [`PaymentError`] when the processor rejects the request or cannot be reached.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// # Errors
    ///
    /// Returns [`PaymentError`] for unknown sessions and transport failures.
    async fn retrieve_session(&self, id: &str) -> Result<CheckoutSession, PaymentError>;
}

/// Whether `session_id` names a paid checkout session.
///
/// Every failure (no id, unknown session, processor down) counts as not paid and is logged.
pub async fn verify_payment(gateway: &dyn PaymentGateway, session_id: Option<&str>) -> bool {
    let Some(id) = session_id.map(str::trim).filter(|id| !id.is_empty()) else {
        tracing::warn!("No session id provided for payment verification");
        return false;
    };

    match gateway.retrieve_session(id).await {
        Ok(session) => {
            let paid = session.is_paid();
            tracing::info!(
                session = id,
                status = session.payment_status.as_deref().unwrap_or("unknown"),
                paid,
                "Payment verification"
            );
            paid
        },
        Err(err) => {
            tracing::error!(session = id, error = %err, "Payment verification failed");
            false
        },
    }
}
