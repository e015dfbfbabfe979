//! Stripe Checkout over its REST API.
//!
//! Only two calls are needed: create a session for the onboarding fee and read it back
//! when the final submission arrives. Requests are form-encoded and authenticated with
//! the secret key as a bearer token.

use crate::error::{PaymentError, PaymentErrorExt};
use crate::gateway::{CheckoutRequest, CheckoutSession, PaymentGateway};
use async_trait::async_trait;
use brite_domain::config::PaymentConfig;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::fmt;

const SESSIONS_PATH: &str = "/v1/checkout/sessions";

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// [`PaymentGateway`] backed by Stripe.
#[derive(Clone)]
pub struct StripeGateway {
    http: Client,
    api_base: String,
    secret_key: String,
}

impl fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeGateway")
            .field("api_base", &self.api_base)
            .field("secret_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl StripeGateway {
    /// # Errors
    ///
    /// Returns [`PaymentError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build Stripe HTTP client")?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = [
            ("line_items[0][price]", request.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("mode", "payment"),
            ("success_url", request.success_url.as_str()),
            ("cancel_url", request.cancel_url.as_str()),
        ];

        let response = self
            .http
            .post(self.url(SESSIONS_PATH))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .context("Create checkout session")?;

        let session = read_session(response).await?;
        tracing::info!(session = %session.id, price = %request.price_id, "Checkout session created");
        Ok(session)
    }

    async fn retrieve_session(&self, id: &str) -> Result<CheckoutSession, PaymentError> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(PaymentError::InvalidSession { message: id.to_owned().into(), context: None });
        }

        let response = self
            .http
            .get(self.url(&format!("{SESSIONS_PATH}/{id}")))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .context("Retrieve checkout session")?;

        read_session(response).await
    }
}

async fn read_session(response: Response) -> Result<CheckoutSession, PaymentError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.context("Malformed checkout session");
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<StripeErrorBody>(&body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unexpected response").to_owned());

    Err(PaymentError::Api { status: status.as_u16(), message: message.into(), context: None })
}
