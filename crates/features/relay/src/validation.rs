//! The completeness check run before a submission may be relayed or paid for.

use brite_domain::submission::FormData;

/// Whether `form` carries every field the automation needs.
///
/// Scalars (`practiceName`, `fullName`, `phone`, `email`, `commission`, `hormone`) must
/// not be blank; `locations`, `providers` and `kits` must be non-empty arrays; `owners` is
/// required when `isSoleOwner` is exactly `false` and `members` when `isMultipleMember`
/// is truthy.
#[must_use]
pub fn validate_form_data(form: &FormData) -> bool {
    validation_failure(form).is_none()
}

/// The first field that fails [`validate_form_data`], for logging.
#[must_use]
pub fn validation_failure(form: &FormData) -> Option<&'static str> {
    form.first_missing_required()
}
