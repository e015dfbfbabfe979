//! Delivery of accepted submissions to the automation webhook.
//!
//! The webhook acknowledges a submission by answering with a JSON body whose `success`
//! is `true`; anything else counts as a failed attempt. Attempts are spaced by
//! [`Backoff`] and, once they are used up, the payload goes to the dead-letter store.

use crate::backoff::Backoff;
use crate::dead_letter::DeadLetterStore;
use crate::error::{RelayError, RelayErrorExt};
use brite_domain::config::RelayConfig;
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info, warn};

/// Where a submission ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered { attempts: u32 },
    /// `file` is `None` when the dead letter itself could not be written.
    DeadLettered { attempts: u32, file: Option<String> },
}

impl Delivery {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Delivered { attempts } | Self::DeadLettered { attempts, .. } => *attempts,
        }
    }
}

/// Retry loop around the webhook POST.
#[derive(Debug, Clone)]
pub struct Forwarder {
    http: Client,
    webhook_url: String,
    max_attempts: u32,
    backoff: Backoff,
    dead_letters: DeadLetterStore,
}

impl Forwarder {
    /// # Errors
    ///
    /// Returns [`RelayError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &RelayConfig, dead_letters: DeadLetterStore) -> Result<Self, RelayError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build webhook HTTP client")?;

        Ok(Self {
            http,
            webhook_url: config.webhook_url.clone(),
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::from_config(config),
            dead_letters,
        })
    }

    #[must_use]
    pub const fn dead_letters(&self) -> &DeadLetterStore {
        &self.dead_letters
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Posts `payload` until the webhook accepts it or the attempts run out.
    pub async fn deliver(&self, payload: &Value) -> Delivery {
        let mut errors = Vec::new();

        for attempt in 1..=self.max_attempts {
            match self.attempt(attempt, payload).await {
                Ok(()) => {
                    info!(attempt, "Webhook accepted submission");
                    return Delivery::Delivered { attempts: attempt };
                },
                Err(message) => {
                    warn!(attempt, error = %message, "Webhook attempt failed");
                    errors.push(message);
                },
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.backoff.delay(attempt)).await;
            }
        }

        error!(attempts = self.max_attempts, "All webhook attempts failed");
        let file = self.dead_letters.record_or_log(payload, &errors).await;
        Delivery::DeadLettered { attempts: self.max_attempts, file }
    }

    /// Sends a dead-lettered payload once more. The file is removed after a successful
    /// delivery unless `keep` is set; a failed attempt leaves it in place.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NotFound`] for unknown files and [`RelayError::Storage`] or
    /// [`RelayError::Json`] when the file cannot be read or removed.
    pub async fn replay(&self, name: &str, keep: bool) -> Result<Delivery, RelayError> {
        let letter = self.dead_letters.load(name).await?;

        match self.attempt(1, &letter.payload).await {
            Ok(()) => {
                info!(file = %name, "Dead letter delivered");
                if !keep {
                    self.dead_letters.remove(name).await?;
                }
                Ok(Delivery::Delivered { attempts: 1 })
            },
            Err(message) => {
                warn!(file = %name, error = %message, "Dead letter replay failed");
                Ok(Delivery::DeadLettered { attempts: 1, file: Some(name.to_owned()) })
            },
        }
    }

    async fn attempt(&self, attempt: u32, payload: &Value) -> Result<(), String> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("Attempt {attempt} error: {e}"))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| format!("Attempt {attempt} error: {e}"))?;

        if !status.is_success() {
            let detail = if body.trim().is_empty() { status.to_string() } else { body };
            return Err(format!("Attempt {attempt} error: {detail}"));
        }

        let parsed = serde_json::from_str::<Value>(&body).ok();
        if parsed.as_ref().and_then(|v| v.get("success")) == Some(&Value::Bool(true)) {
            return Ok(());
        }

        let shown = parsed.map_or(body, |v| v.to_string());
        Err(format!("Attempt {attempt} failed with response: {shown}"))
    }
}
