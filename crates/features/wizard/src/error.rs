use crate::validation::ValidationErrors;
use std::borrow::Cow;

/// Error types of the wizard slice.
#[brite_derive::brite_error]
pub enum WizardError {
    #[status(404)]
    #[error("Unknown wizard step{}: {message}", format_context(.context))]
    UnknownStep { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// One or more fields of the submitted step are invalid.
    #[status(422)]
    #[error("Form validation failed{}: {errors}", format_context(.context))]
    Invalid { errors: ValidationErrors, context: Option<Cow<'static, str>> },

    /// A built-in validation pattern failed to compile.
    #[error("Invalid validation pattern{}: {source}", format_context(.context))]
    Pattern { source: regex::Error, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Wizard state unavailable{}: {source}", format_context(.context))]
    State { source: brite_kernel::server::ApiStateError, context: Option<Cow<'static, str>> },
}

impl From<ValidationErrors> for WizardError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid { errors, context: None }
    }
}
