//! Relay feature slice: accepts the final multipart submission once its payment is
//! verified, answers right away and forwards the data to the automation webhook in the
//! background.
//!
//! Deliveries that exhaust their retries, and submissions whose payment could not be
//! verified, are written to the dead-letter directory. Nothing re-drives them
//! automatically; the operator CLI replays them one by one.

mod backoff;
mod dead_letter;
mod error;
mod forwarder;
#[cfg(feature = "server")]
mod handlers;
mod intake;
mod validation;

pub use backoff::Backoff;
pub use dead_letter::{DeadLetter, DeadLetterStore};
pub use error::{RelayError, RelayErrorExt};
pub use forwarder::{Delivery, Forwarder};
pub use intake::{Submission, Upload};
pub use validation::{validate_form_data, validation_failure};

use brite_domain::config::RelayConfig;
use brite_kernel::domain::registry::InitializedSlice;
use brite_storage::Storage;
use serde_json::Value;
use tokio::task::JoinHandle;

/// Relay feature state
#[brite_derive::brite_slice]
pub struct Relay {
    forwarder: Forwarder,
}

impl Relay {
    /// # Errors
    ///
    /// Returns [`RelayError::Http`] if the webhook client cannot be built.
    pub fn build(config: &RelayConfig, storage: Storage) -> Result<Self, RelayError> {
        let forwarder = Forwarder::new(config, DeadLetterStore::new(storage))?;
        Ok(Self::new(RelayInner { forwarder }))
    }
}

impl RelayInner {
    #[must_use]
    pub const fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    #[must_use]
    pub const fn dead_letters(&self) -> &DeadLetterStore {
        self.forwarder.dead_letters()
    }

    /// Starts a detached delivery of `payload`; the caller does not wait for it.
    pub fn submit(&self, payload: Value) -> JoinHandle<Delivery> {
        let forwarder = self.forwarder.clone();
        tokio::spawn(async move { forwarder.deliver(&payload).await })
    }
}

/// Initialize the relay feature on top of the dead-letter `storage`.
///
/// # Errors
///
/// Returns [`RelayError::Http`] if the webhook client cannot be built.
pub fn init(config: &RelayConfig, storage: Storage) -> Result<InitializedSlice, RelayError> {
    let failed_dir = storage.root().display().to_string();
    let slice = Relay::build(config, storage)?;

    tracing::info!(
        max_attempts = slice.forwarder().max_attempts(),
        failed_dir = %failed_dir,
        "Relay slice initialized"
    );

    Ok(slice.into_slice())
}

/// Routes of the relay slice.
#[cfg(feature = "server")]
pub fn router() -> utoipa_axum::router::OpenApiRouter<brite_kernel::server::ApiState> {
    utoipa_axum::router::OpenApiRouter::new().routes(utoipa_axum::routes!(handlers::send_data_handler))
}
