//! Facade crate for the BRITE onboarding features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `brite` with the `server` feature for the HTTP binary, without it for tools.
//! - Open the dead-letter [`Storage`] first, then call [`init`] to build every slice.

pub use brite_domain as domain;
pub use brite_kernel as kernel;
pub use brite_storage as storage;

use brite_domain::config::ApiConfig;
use brite_domain::registry::InitializedSlice;
use brite_storage::Storage;
use std::borrow::Cow;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use brite_kernel::server::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use brite_contract as contract;
    pub use brite_payment as payment;
    pub use brite_relay as relay;
    pub use brite_wizard as wizard;

    /// Slices built by [`crate::init`], in registration order.
    pub const SLICES: &[&str] = &["wizard", "payment", "contract", "relay"];

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Failure of one slice during [`init`].
#[brite_derive::brite_error]
pub enum InitError {
    #[error("Wizard slice failed{}: {source}", format_context(.context))]
    Wizard { source: features::wizard::WizardError, context: Option<Cow<'static, str>> },
    #[error("Payment slice failed{}: {source}", format_context(.context))]
    Payment { source: features::payment::PaymentError, context: Option<Cow<'static, str>> },
    #[error("Contract slice failed{}: {source}", format_context(.context))]
    Contract { source: features::contract::ContractError, context: Option<Cow<'static, str>> },
    #[error("Relay slice failed{}: {source}", format_context(.context))]
    Relay { source: features::relay::RelayError, context: Option<Cow<'static, str>> },
}

/// Initialize every feature slice.
///
/// `storage` is the dead-letter directory (`relay.failed_dir`), opened by the caller.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(config: &ApiConfig, storage: Storage) -> Result<Vec<InitializedSlice>, InitError> {
    let slices = vec![
        features::wizard::init()?,
        features::payment::init(&config.payment)?,
        features::contract::init(&config.contract)?,
        features::relay::init(&config.relay, storage)?,
    ];

    tracing::debug!(slices = slices.len(), "Feature slices initialized");
    Ok(slices)
}

/// Routes of every feature slice plus the system routes.
#[cfg(feature = "server")]
pub fn router() -> utoipa_axum::router::OpenApiRouter<brite_kernel::server::ApiState> {
    utoipa_axum::router::OpenApiRouter::new()
        .merge(server::router::system_router())
        .merge(features::wizard::router())
        .merge(features::payment::router())
        .merge(features::contract::router())
        .merge(features::relay::router())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn initializes_every_slice() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::builder().root(dir.path()).create(true).connect().await.unwrap();

        let slices = init(&ApiConfig::default(), storage).unwrap();
        assert_eq!(slices.len(), features::SLICES.len());
    }
}
