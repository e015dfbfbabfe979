//! Contract feature slice: renders the BRITE-Provider agreement, filled with the
//! practice's details and signatures, as a self-contained PDF.
//!
//! The renderer writes PDF directly: two standard Type 1 fonts, deflated content streams
//! and the signature images as XObjects. Nothing is embedded besides the images, so a
//! typical agreement stays well under 100 KiB.

mod data;
mod error;
mod fonts;
#[cfg(feature = "server")]
mod handlers;
mod image;
mod layout;
mod pdf;
mod render;
mod template;

pub use data::ContractData;
pub use error::{ContractError, ContractErrorExt};
pub use image::{ColorSpace, SignatureImage};
pub use render::render;
pub use template::{Block, EFFECTIVE_DATE, PRACTICE_ADDRESS, PRACTICE_NAME, Span, Template};

use brite_domain::config::ContractConfig;
use brite_kernel::domain::registry::InitializedSlice;

/// Suggested file name for downloads.
pub const FILE_NAME: &str = "brite-provider-agreement.pdf";

/// Contract feature state
#[brite_derive::brite_slice]
pub struct Contract {
    template: Template,
    counter_signature: Option<SignatureImage>,
}

impl Contract {
    /// Loads the agreement and the optional counter-signature named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Io`] if the counter-signature cannot be read and
    /// [`ContractError::Image`] if it is not a supported image.
    pub fn build(config: &ContractConfig) -> Result<Self, ContractError> {
        let counter_signature = match &config.counter_signature {
            Some(path) => {
                let bytes = std::fs::read(path).context("counter signature")?;
                Some(SignatureImage::from_bytes(&bytes).context("counter signature")?)
            },
            None => None,
        };

        Ok(Self::new(ContractInner { template: Template::agreement()?, counter_signature }))
    }
}

impl ContractInner {
    #[must_use]
    pub const fn template(&self) -> &Template {
        &self.template
    }

    #[must_use]
    pub const fn is_counter_signed(&self) -> bool {
        self.counter_signature.is_some()
    }

    /// Renders the agreement for `data`, see [`render`].
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Io`] if compression fails.
    pub fn render(&self, data: &ContractData) -> Result<Vec<u8>, ContractError> {
        render(&self.template, data, self.counter_signature.as_ref())
    }
}

/// Initialize the contract feature.
///
/// # Errors
///
/// Returns [`ContractError`] if the template or the counter-signature cannot be loaded.
pub fn init(config: &ContractConfig) -> Result<InitializedSlice, ContractError> {
    let slice = Contract::build(config)?;

    tracing::info!(counter_signed = slice.is_counter_signed(), "Contract slice initialized");

    Ok(slice.into_slice())
}

/// Routes of the contract slice.
#[cfg(feature = "server")]
pub fn router() -> utoipa_axum::router::OpenApiRouter<brite_kernel::server::ApiState> {
    utoipa_axum::router::OpenApiRouter::new().routes(utoipa_axum::routes!(handlers::contract_handler))
}
