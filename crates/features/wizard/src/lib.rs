//! Wizard feature slice: step navigation, per-step validation and the side effects a step
//! applies to the form when the browser moves forward.
//!
//! ```rust
//! use brite_wizard::{Step, Wizard};
//! use brite_domain::submission::FormData;
//!
//! let wizard = Wizard::build().unwrap();
//! let mut form = FormData::new();
//! form.insert("practiceName", "Glow Clinic");
//!
//! let advance = wizard.advance(Step::PracticeName, form, false).unwrap();
//! assert_eq!(advance.next, Some(Step::PracticeLogo));
//! ```

mod error;
mod flow;
mod format;
#[cfg(feature = "server")]
mod handlers;
mod kits;
mod validation;

pub use brite_domain::step::{Step, TOTAL_STEPS};
pub use error::{WizardError, WizardErrorExt};
pub use flow::{is_reachable, next, previous, route};
pub use format::{COMMISSION_CAP_PER_ORDER, DEFAULT_COMMISSION, commission_per_order, format_phone};
pub use kits::sync_kits;
pub use validation::{FieldError, HORMONE_OPTIONS, MEMBER_ROLES, ValidationErrors, Validator};

use brite_domain::constants::fields;
use brite_domain::submission::FormData;
use brite_kernel::domain::registry::InitializedSlice;
use tracing::debug;

/// Wizard feature state
#[brite_derive::brite_slice]
pub struct Wizard {
    validator: Validator,
}

/// Outcome of a successful step.
#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    pub step: Step,
    /// `None` once the last step is done and checkout takes over.
    pub next: Option<Step>,
    pub form: FormData,
}

impl Wizard {
    /// # Errors
    ///
    /// Returns [`WizardError::Pattern`] if the validation patterns fail to compile.
    pub fn build() -> Result<Self, WizardError> {
        Ok(Self::new(WizardInner { validator: Validator::new()? }))
    }
}

impl WizardInner {
    #[must_use]
    pub const fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Validates `step`, applies its side effects and picks the next screen.
    ///
    /// The practice markup step fills `commission` with the default when it is blank;
    /// the provider step re-syncs the kit list with the providers.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Invalid`] with every failing field.
    pub fn advance(
        &self,
        step: Step,
        mut form: FormData,
        has_logo: bool,
    ) -> Result<Advance, WizardError> {
        if step == Step::PracticeMarkup && !form.is_filled(fields::COMMISSION) {
            form.insert(fields::COMMISSION, DEFAULT_COMMISSION);
        }

        self.validator
            .validate(step, &form, has_logo)
            .map_err(WizardError::from)
            .context(step.key())?;

        if step == Step::MultipleProvider {
            sync_kits(&mut form);
        }

        let following = flow::next(step, &form);
        debug!(step = step.number(), next = following.map(Step::number), "Wizard step accepted");
        Ok(Advance { step, next: following, form })
    }
}

/// Initialize the wizard feature.
///
/// # Errors
///
/// Returns [`WizardError::Pattern`] if the validation patterns fail to compile.
pub fn init() -> Result<InitializedSlice, WizardError> {
    let slice = Wizard::build()?;

    tracing::info!("Wizard slice initialized");

    Ok(slice.into_slice())
}

/// Routes of the wizard slice.
#[cfg(feature = "server")]
pub fn router() -> utoipa_axum::router::OpenApiRouter<brite_kernel::server::ApiState> {
    use utoipa_axum::routes;

    utoipa_axum::router::OpenApiRouter::new()
        .routes(routes!(handlers::steps_handler))
        .routes(routes!(handlers::advance_handler))
}
