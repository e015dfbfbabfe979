//! Payment feature slice: creates Stripe Checkout sessions for the onboarding fee and
//! verifies them before a submission is relayed.

mod error;
mod gateway;
#[cfg(feature = "server")]
mod handlers;
mod stripe;

pub use error::{PaymentError, PaymentErrorExt};
pub use gateway::{CheckoutRequest, CheckoutSession, PaymentGateway, verify_payment};
pub use stripe::StripeGateway;

use brite_domain::config::PaymentConfig;
use brite_kernel::domain::registry::InitializedSlice;
use std::sync::Arc;

/// Payment feature state
#[brite_derive::brite_slice]
pub struct Payment {
    gateway: Arc<dyn PaymentGateway>,
    default_price_id: Option<String>,
}

impl Payment {
    /// Wraps an existing gateway, e.g. a test double.
    #[must_use]
    pub fn with_gateway(gateway: Arc<dyn PaymentGateway>, default_price_id: Option<String>) -> Self {
        Self::new(PaymentInner { gateway, default_price_id })
    }
}

impl PaymentInner {
    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.gateway.as_ref()
    }

    /// `requested` when it is not blank, the configured default otherwise.
    #[must_use]
    pub fn price_for(&self, requested: Option<&str>) -> Option<String> {
        requested
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or_else(|| self.default_price_id.as_deref())
            .map(str::to_owned)
    }

    /// Checks a checkout session id, see [`verify_payment`].
    pub async fn verify(&self, session_id: Option<&str>) -> bool {
        verify_payment(self.gateway(), session_id).await
    }
}

/// Initialize the payment feature.
///
/// # Errors
///
/// Returns [`PaymentError::Http`] if the Stripe client cannot be built.
pub fn init(config: &PaymentConfig) -> Result<InitializedSlice, PaymentError> {
    let gateway = StripeGateway::new(config)?;
    let slice = Payment::with_gateway(Arc::new(gateway), config.default_price_id.clone());

    tracing::info!(api_base = %config.api_base, "Payment slice initialized");

    Ok(slice.into_slice())
}

/// Routes of the payment slice.
#[cfg(feature = "server")]
pub fn router() -> utoipa_axum::router::OpenApiRouter<brite_kernel::server::ApiState> {
    utoipa_axum::router::OpenApiRouter::new()
        .routes(utoipa_axum::routes!(handlers::create_checkout_session_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Paid;

    #[async_trait]
    impl PaymentGateway for Paid {
        async fn create_checkout_session(
            &self,
            _request: &CheckoutRequest,
        ) -> Result<CheckoutSession, PaymentError> {
            Err("not used".into())
        }

        async fn retrieve_session(&self, id: &str) -> Result<CheckoutSession, PaymentError> {
            Ok(CheckoutSession { id: id.to_owned(), payment_status: Some("paid".into()), url: None })
        }
    }

    #[test]
    fn requested_price_wins_over_default() {
        let payment = Payment::with_gateway(Arc::new(Paid), Some("price_default".into()));
        assert_eq!(payment.price_for(Some("price_x")).as_deref(), Some("price_x"));
        assert_eq!(payment.price_for(Some("  ")).as_deref(), Some("price_default"));
        assert_eq!(payment.price_for(None).as_deref(), Some("price_default"));

        let bare = Payment::with_gateway(Arc::new(Paid), None);
        assert_eq!(bare.price_for(None), None);
    }

    #[tokio::test]
    async fn verify_delegates_to_gateway() {
        let payment = Payment::with_gateway(Arc::new(Paid), None);
        assert!(payment.verify(Some("cs_1")).await);
        assert!(!payment.verify(None).await);
    }
}
