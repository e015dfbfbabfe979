//! Per-step field validation.
//!
//! Every rule reports a [`FieldError`] keyed by a path into the form (`owners[1].email`) so
//! the browser can attach the message to the right input. Rules never stop at the first
//! failure; the caller gets the complete list for the step.

use crate::error::{WizardError, WizardErrorExt};
use brite_derive::api_model;
use brite_domain::constants::fields;
use brite_domain::step::Step;
use brite_domain::submission::FormData;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

const NAME_PATTERN: &str = r"^[A-Za-z\s]{3,}$";
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const ZIP_PATTERN: &str = r"^[0-9]{5,6}$";

/// Top-level domain refused even though it matches the address pattern.
const REJECTED_TLD: &str = "co";

/// Answers accepted on the hormone step, compared after trimming.
pub const HORMONE_OPTIONS: [&str; 3] = [
    "Practice Will Pay for Hormones",
    "Practice Will Pay for Hormones & Shipping",
    "Practice Will Pay for Hormones, Other Medications, Testing, & Shipping",
];

/// Operations Hub permissions a team member can be granted.
pub const MEMBER_ROLES: [&str; 3] = ["Assistant", "Finance", "Analyst"];

const PREVIOUS_PAGE_EMAIL: &str = "This email address was already entered on a previous page. \
                                   Please enter a different email address.";
const INVALID_EMAIL: &str = "Enter a valid email address.";
const EMAIL_REQUIRED: &str = "Email address is required.";
const NAME_REQUIRED: &str = "Full name is required.";
const CHOOSE_OPTION: &str = "Please select an option before proceeding.";

/// A single rejected field.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the field, e.g. `providers[0].email`
    pub field: String,
    /// Message shown next to the field
    pub message: String,
}

/// Every field error found on one step, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError { field: field.into(), message: message.into() });
    }

    /// Adds the error unless the field already has one.
    fn push_once(&mut self, field: String, message: impl Into<String>) {
        if !self.has(&field) {
            self.push(field, message);
        }
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

/// Compiled patterns plus the step rules that use them.
#[derive(Debug, Clone)]
pub struct Validator {
    name: Regex,
    email: Regex,
    zip: Regex,
}

impl Validator {
    /// # Errors
    ///
    /// Returns [`WizardError::Pattern`] if a built-in pattern fails to compile.
    pub fn new() -> Result<Self, WizardError> {
        Ok(Self {
            name: Regex::new(NAME_PATTERN).context("name pattern")?,
            email: Regex::new(EMAIL_PATTERN).context("email pattern")?,
            zip: Regex::new(ZIP_PATTERN).context("zip pattern")?,
        })
    }

    /// At least three letters or spaces, nothing else.
    #[must_use]
    pub fn is_valid_name(&self, name: &str) -> bool {
        self.name.is_match(name.trim())
    }

    #[must_use]
    pub fn is_valid_email(&self, email: &str) -> bool {
        let email = email.trim();
        self.email.is_match(email) && email.rsplit('.').next() != Some(REJECTED_TLD)
    }

    #[must_use]
    pub fn is_valid_zip(&self, zip: &str) -> bool {
        self.zip.is_match(zip.trim())
    }

    /// Checks the fields owned by `step`.
    ///
    /// `has_logo` tells whether the browser holds an uploaded logo; the file itself only
    /// travels with the final submission.
    ///
    /// # Errors
    ///
    /// Returns every failing field of the step.
    pub fn validate(
        &self,
        step: Step,
        form: &FormData,
        has_logo: bool,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        match step {
            Step::PracticeName => self.practice_name(form, &mut errors),
            Step::PracticeLogo => {
                if !has_logo {
                    errors.push(fields::LOGO, "Please upload a logo before proceeding.");
                }
            },
            Step::FaxNumber => fax(form, &mut errors),
            Step::FullName => self.full_name(form, &mut errors),
            Step::ContactNumber => {
                if let Some(message) = phone_error(form.text(fields::PHONE)) {
                    errors.push(fields::PHONE, message);
                }
            },
            Step::EmailAddress => {
                if let Some(message) = self.email_error(form.text(fields::EMAIL)) {
                    errors.push(fields::EMAIL, message);
                }
            },
            Step::SoleOwner => {
                if form.bool(fields::IS_SOLE_OWNER).is_none() {
                    errors.push(fields::IS_SOLE_OWNER, CHOOSE_OPTION);
                }
            },
            Step::AdditionalOwner => self.owners(form, &mut errors),
            Step::MultipleLocations => self.locations(form, &mut errors),
            Step::MultipleProvider => self.providers(form, &mut errors),
            Step::Kits => kits(form, &mut errors),
            Step::PricingModal => {
                if !form.is_truthy(fields::IS_PRICING_ACKNOWLEDGED) {
                    errors.push(
                        fields::IS_PRICING_ACKNOWLEDGED,
                        "Please acknowledge that you've read and understood the pricing \
                         structure above.",
                    );
                }
            },
            Step::PracticeMarkup => commission(form, &mut errors),
            Step::Hormone => {
                let hormone = form.text(fields::HORMONE);
                if !HORMONE_OPTIONS.contains(&hormone) {
                    errors.push(fields::HORMONE, CHOOSE_OPTION);
                }
            },
            Step::OperationHubMessage => {
                if !form.is_truthy(fields::IS_OPERATION_HUB_ACKNOWLEDGED) {
                    errors.push(
                        fields::IS_OPERATION_HUB_ACKNOWLEDGED,
                        "Please acknowledge that you have read and understand the purpose of \
                         the Operations Hub before proceeding",
                    );
                }
            },
            Step::AskMoreThanOneMember => {
                if form.bool(fields::IS_MULTIPLE_MEMBER).is_none() {
                    errors.push(fields::IS_MULTIPLE_MEMBER, CHOOSE_OPTION);
                }
            },
            Step::AdditionalMembers => self.members(form, &mut errors),
            Step::Contract => {
                if form.text(fields::SIGNATURE).is_empty() {
                    errors.push(fields::SIGNATURE, "Please sign the document before proceeding.");
                }
            },
            Step::CardVerification => {},
        }

        errors.into_result()
    }

    fn practice_name(&self, form: &FormData, errors: &mut ValidationErrors) {
        let name = form.text(fields::PRACTICE_NAME);
        if name.is_empty() {
            errors.push(fields::PRACTICE_NAME, "Practice name is required.");
        } else if !self.is_valid_name(name) {
            errors.push(fields::PRACTICE_NAME, "Practice name must be at least 3 letters long.");
        }
    }

    fn full_name(&self, form: &FormData, errors: &mut ValidationErrors) {
        let name = form.text(fields::FULL_NAME);
        if name.is_empty() {
            errors.push(fields::FULL_NAME, NAME_REQUIRED);
        } else if !self.is_valid_name(name) {
            errors.push(fields::FULL_NAME, "Full name must be at least 3 letters long.");
        }
    }

    fn email_error(&self, email: &str) -> Option<&'static str> {
        if email.trim().is_empty() {
            Some(EMAIL_REQUIRED)
        } else if !self.is_valid_email(email) {
            Some(INVALID_EMAIL)
        } else {
            None
        }
    }

    fn owners(&self, form: &FormData, errors: &mut ValidationErrors) {
        let owners = form.owners();
        if owners.is_empty() {
            errors.push(fields::OWNERS, "Add at least one owner.");
            return;
        }

        let practice_email = normalized(form.text(fields::EMAIL));
        let mut seen_emails = Vec::with_capacity(owners.len());

        for (i, owner) in owners.iter().enumerate() {
            let name = owner.full_name.trim();
            if name.is_empty() {
                errors.push(path(fields::OWNERS, i, "fullName"), NAME_REQUIRED);
            } else if name.chars().count() < 3 {
                errors.push(
                    path(fields::OWNERS, i, "fullName"),
                    "Full name must be at least 3 characters long.",
                );
            }

            let email = normalized(&owner.email);
            if let Some(message) = self.email_error(&owner.email) {
                errors.push(path(fields::OWNERS, i, "email"), message);
            } else if email == practice_email {
                errors.push(path(fields::OWNERS, i, "email"), PREVIOUS_PAGE_EMAIL);
            } else if seen_emails.contains(&email) {
                errors.push(
                    path(fields::OWNERS, i, "email"),
                    "You have already used this email for another owner. Please enter a unique \
                     email.",
                );
            }
            seen_emails.push(email);

            if let Some(message) = phone_error(&owner.phone) {
                errors.push(path(fields::OWNERS, i, "phone"), message);
            }
        }

        for indices in duplicates(owners.iter().map(|o| normalized(&o.full_name))) {
            for i in indices {
                errors.push_once(
                    path(fields::OWNERS, i, "fullName"),
                    "Duplicate owner name is not allowed.",
                );
            }
        }

        let phones = owners.iter().map(|o| {
            let phone = digits(&o.phone);
            if phone.len() == 10 { phone } else { String::new() }
        });
        for indices in duplicates(phones) {
            for i in indices {
                errors.push_once(
                    path(fields::OWNERS, i, "phone"),
                    "Duplicate phone number is not allowed.",
                );
            }
        }
    }

    fn locations(&self, form: &FormData, errors: &mut ValidationErrors) {
        let locations = form.locations();
        if locations.is_empty() {
            errors.push(fields::LOCATIONS, "Add at least one location.");
            return;
        }

        for (i, location) in locations.iter().enumerate() {
            if location.street_address.trim().is_empty() {
                errors.push(
                    path(fields::LOCATIONS, i, "streetAddress"),
                    "Address Line 1 is required.",
                );
            }
            if location.city.trim().is_empty() {
                errors.push(path(fields::LOCATIONS, i, "city"), "City is required.");
            }
            if location.state.trim().is_empty() {
                errors.push(path(fields::LOCATIONS, i, "state"), "State is required.");
            }
            if !self.is_valid_zip(&location.zip_code) {
                errors.push(path(fields::LOCATIONS, i, "zipCode"), "Enter a valid ZIP Code.");
            }
        }

        for indices in duplicates(locations.iter().map(|l| l.street_address.trim().to_owned())) {
            let numbers: Vec<String> = indices.iter().map(|i| (i + 1).to_string()).collect();
            let address = locations[indices[0]].street_address.trim();
            let message = format!(
                "Duplicate address \"{address}\" found for Location {}.",
                numbers.join(" and ")
            );
            for i in indices {
                errors.push_once(path(fields::LOCATIONS, i, "streetAddress"), message.clone());
            }
        }
    }

    fn providers(&self, form: &FormData, errors: &mut ValidationErrors) {
        let providers = form.providers();
        if providers.is_empty() {
            errors.push(fields::PROVIDERS, "Add at least one provider.");
            return;
        }

        let practice_email = normalized(form.text(fields::EMAIL));
        let owner_emails: Vec<String> = form.owners().iter().map(|o| normalized(&o.email)).collect();
        let mut seen_emails = Vec::with_capacity(providers.len());

        for (i, provider) in providers.iter().enumerate() {
            let name = provider.provider_full_name.trim();
            if name.is_empty() {
                errors.push(path(fields::PROVIDERS, i, "providerFullName"), NAME_REQUIRED);
            } else if name.chars().count() < 3 {
                errors.push(
                    path(fields::PROVIDERS, i, "providerFullName"),
                    "Full name should be at least 3 characters long.",
                );
            }

            let email = normalized(&provider.email);
            let field = path(fields::PROVIDERS, i, "email");
            if let Some(message) = self.email_error(&provider.email) {
                errors.push(field, message);
            } else if email == practice_email {
                errors.push(field, PREVIOUS_PAGE_EMAIL);
            } else if owner_emails.contains(&email) {
                errors.push(
                    field,
                    "you have already used this email for owner email, please enter a unique \
                     email.",
                );
            } else if seen_emails.contains(&email) {
                errors.push(
                    field,
                    "You have already used this email for another provider. Please enter a \
                     unique email.",
                );
            }
            seen_emails.push(email);

            if provider.selected_locations.iter().all(|l| l.trim().is_empty()) {
                errors.push(
                    path(fields::PROVIDERS, i, "selectedLocations"),
                    "Select at least one location.",
                );
            }
        }

        for indices in duplicates(providers.iter().map(|p| normalized(&p.provider_full_name))) {
            for i in indices {
                errors.push_once(
                    path(fields::PROVIDERS, i, "providerFullName"),
                    "Duplicate provider name is not allowed.",
                );
            }
        }
    }

    fn members(&self, form: &FormData, errors: &mut ValidationErrors) {
        let members = form.members();
        if members.is_empty() {
            errors.push(fields::MEMBERS, "Add at least one team member.");
            return;
        }

        let practice_email = normalized(form.text(fields::EMAIL));
        let owner_emails: Vec<String> = form.owners().iter().map(|o| normalized(&o.email)).collect();
        let provider_emails: Vec<String> =
            form.providers().iter().map(|p| normalized(&p.email)).collect();
        let mut seen_emails = Vec::with_capacity(members.len());

        for (i, member) in members.iter().enumerate() {
            let name = member.staff_name.trim();
            if name.is_empty() {
                errors.push(path(fields::MEMBERS, i, "staffName"), NAME_REQUIRED);
            } else if !self.is_valid_name(name) {
                errors.push(
                    path(fields::MEMBERS, i, "staffName"),
                    "Full name must be at least 3 letters long.",
                );
            }

            let email = normalized(&member.email);
            let field = path(fields::MEMBERS, i, "email");
            if let Some(message) = self.email_error(&member.email) {
                errors.push(field, message);
            } else if email == practice_email {
                errors.push(
                    field,
                    "You have already used this email for practice email. Please enter a unique \
                     email for team member.",
                );
            } else if owner_emails.contains(&email) {
                errors.push(
                    field,
                    "This email is already used by an owner. Please enter a unique email.",
                );
            } else if provider_emails.contains(&email) {
                errors.push(
                    field,
                    "This email is already used by a provider. Please enter a unique email.",
                );
            } else if seen_emails.contains(&email) {
                errors.push(field, "Duplicate email found. Please enter a unique email.");
            }
            seen_emails.push(email);

            if member.roles.is_empty()
                || member.roles.iter().any(|r| !MEMBER_ROLES.contains(&r.trim()))
            {
                errors.push(path(fields::MEMBERS, i, "roles"), "Select the permissions in the hub.");
            }
            if member.primary_duties.trim().is_empty() {
                errors.push(path(fields::MEMBERS, i, "primaryDuties"), "Enter the primary duties.");
            }
            if member.selected_locations.iter().all(|l| l.trim().is_empty()) {
                errors.push(
                    path(fields::MEMBERS, i, "selectedLocations"),
                    "Select the location(s)",
                );
            }
        }
    }
}

fn fax(form: &FormData, errors: &mut ValidationErrors) {
    let raw = form
        .str(fields::FAX)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| form.str(fields::FAX_NUMBER))
        .unwrap_or_default();
    let fax = digits(raw);
    if !fax.is_empty() && fax.len() != 10 {
        errors.push(fields::FAX, "Fax number must be 10 digits.");
    }
}

fn phone_error(phone: &str) -> Option<&'static str> {
    match digits(phone).len() {
        0 => Some("Phone number is required."),
        10 => None,
        _ => Some("Phone number must be 10 digits."),
    }
}

fn kits(form: &FormData, errors: &mut ValidationErrors) {
    let kits = form.kits();
    if kits.is_empty() {
        errors.push(fields::KITS, "Add at least one kit.");
    }

    for (i, kit) in kits.iter().enumerate() {
        if kit.shipping_provider.trim().is_empty() {
            errors.push(path(fields::KITS, i, "shippingProvider"), "Name is required.");
        }
        if kit.shipping_location.trim().is_empty() {
            errors.push(
                path(fields::KITS, i, "shippingLocation"),
                "Select/Add the shipping location.",
            );
        }
    }

    let practice: Vec<String> =
        form.locations().iter().map(|l| normalized(&l.street_address)).collect();
    let mut seen: Vec<String> = Vec::new();
    for (i, location) in form.shipping_locations().iter().enumerate() {
        let street = normalized(&location.street_address);
        if street.is_empty() {
            continue;
        }
        if practice.contains(&street) || seen.contains(&street) {
            errors.push(
                path(fields::SHIPPING_FULL_LOCATIONS, i, "streetAddress"),
                "Location already exists",
            );
        }
        seen.push(street);
    }
}

fn commission(form: &FormData, errors: &mut ValidationErrors) {
    let valid = form
        .commission()
        .is_some_and(|c| (0.0..=100.0).contains(&c) && (c * 2.0).fract() == 0.0);
    if !valid {
        errors.push(
            fields::COMMISSION,
            "Commission must be a number between 0 and 100 in steps of 0.5.",
        );
    }
}

/// ASCII digits of `input`, in order.
pub(crate) fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn normalized(value: &str) -> String {
    value.trim().to_lowercase()
}

fn path(list: &str, index: usize, field: &str) -> String {
    format!("{list}[{index}].{field}")
}

/// Index groups of equal, non-empty keys that occur more than once, in first-seen order.
fn duplicates(keys: impl Iterator<Item = String>) -> Vec<Vec<usize>> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, key) in keys.enumerate() {
        if key.is_empty() {
            continue;
        }
        groups
            .entry(key)
            .or_insert_with_key(|k| {
                order.push(k.clone());
                Vec::new()
            })
            .push(i);
    }
    order.into_iter().filter_map(|k| groups.remove(&k)).filter(|g| g.len() > 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn form(value: Value) -> FormData {
        serde_json::from_value(value).unwrap()
    }

    fn fields_of(result: Result<(), ValidationErrors>) -> Vec<String> {
        result.err().map(|e| e.iter().map(|f| f.field.clone()).collect()).unwrap_or_default()
    }

    #[test]
    fn practice_name_needs_three_letters() {
        let v = Validator::new().unwrap();
        assert!(v.validate(Step::PracticeName, &form(json!({"practiceName": "Glow Clinic"})), false).is_ok());

        let err = v
            .validate(Step::PracticeName, &form(json!({"practiceName": "G1"})), false)
            .unwrap_err();
        assert_eq!(err.iter().next().unwrap().message, "Practice name must be at least 3 letters long.");

        let err = v.validate(Step::PracticeName, &FormData::new(), false).unwrap_err();
        assert_eq!(err.iter().next().unwrap().message, "Practice name is required.");
    }

    #[test]
    fn email_rejects_co_domain() {
        let v = Validator::new().unwrap();
        assert!(v.is_valid_email("ann@clinic.com"));
        assert!(v.is_valid_email("ann@clinic.co.uk"));
        assert!(!v.is_valid_email("ann@clinic.co"));
        assert!(!v.is_valid_email("ann@clinic"));
        assert!(!v.is_valid_email("ann clinic@x.com"));
    }

    #[test]
    fn fax_is_optional_but_exact() {
        let v = Validator::new().unwrap();
        assert!(v.validate(Step::FaxNumber, &FormData::new(), false).is_ok());
        assert!(v.validate(Step::FaxNumber, &form(json!({"fax": "(512)-555-0100"})), false).is_ok());
        assert!(v.validate(Step::FaxNumber, &form(json!({"faxNumber": "512555"})), false).is_err());
    }

    #[test]
    fn logo_step_uses_flag() {
        let v = Validator::new().unwrap();
        assert!(v.validate(Step::PracticeLogo, &FormData::new(), true).is_ok());
        assert_eq!(fields_of(v.validate(Step::PracticeLogo, &FormData::new(), false)), vec!["logo"]);
    }

    #[test]
    fn owners_reject_practice_email_and_duplicates() {
        let v = Validator::new().unwrap();
        let data = form(json!({
            "email": "lead@glow.com",
            "owners": [
                { "fullName": "Ann Lee", "email": "LEAD@glow.com", "phone": "5125550100" },
                { "fullName": "ann lee", "email": "bo@glow.com", "phone": "5125550100" },
                { "fullName": "Bo", "email": "bo@glow.com", "phone": "123" }
            ]
        }));
        let err = v.validate(Step::AdditionalOwner, &data, false).unwrap_err();
        let fields: Vec<&str> = err.iter().map(|e| e.field.as_str()).collect();

        assert!(fields.contains(&"owners[0].email"));
        assert!(fields.contains(&"owners[2].email"));
        assert!(fields.contains(&"owners[2].fullName"));
        assert!(fields.contains(&"owners[2].phone"));
        assert!(fields.contains(&"owners[1].fullName"));
        assert!(fields.contains(&"owners[1].phone"));
    }

    #[test]
    fn malformed_provider_entries_are_still_checked() {
        let v = Validator::new().unwrap();
        let data = form(json!({
            "email": "lead@glow.com",
            "providers": [
                { "providerFullName": "Dr Kim", "email": "kim@glow.com", "selectedLocations": ["1 Main St"] },
                { "providerFullName": null, "email": "bad", "selectedLocations": [] },
                7
            ]
        }));
        let fields = fields_of(v.validate(Step::MultipleProvider, &data, false));

        assert!(fields.contains(&"providers[1].providerFullName".to_owned()), "{fields:?}");
        assert!(fields.contains(&"providers[1].email".to_owned()), "{fields:?}");
        assert!(fields.contains(&"providers[1].selectedLocations".to_owned()), "{fields:?}");
        assert!(fields.contains(&"providers[2].providerFullName".to_owned()), "{fields:?}");
        assert!(!fields.iter().any(|f| f.starts_with("providers[0]")), "{fields:?}");
    }

    #[test]
    fn locations_flag_duplicate_streets() {
        let v = Validator::new().unwrap();
        let location = json!({
            "streetAddress": "1 Main St", "city": "Austin", "state": "TX", "zipCode": "73301"
        });
        let data = form(json!({ "locations": [location.clone(), location] }));
        let err = v.validate(Step::MultipleLocations, &data, false).unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.iter().all(|e| e.message.contains("Location 1 and 2")));
    }

    #[test]
    fn zip_needs_five_or_six_digits() {
        let v = Validator::new().unwrap();
        assert!(v.is_valid_zip("73301"));
        assert!(v.is_valid_zip("733012"));
        assert!(!v.is_valid_zip("7330"));
        assert!(!v.is_valid_zip("73301-1234"));
    }

    #[test]
    fn providers_cannot_reuse_owner_email() {
        let v = Validator::new().unwrap();
        let data = form(json!({
            "email": "lead@glow.com",
            "owners": [{ "fullName": "Ann Lee", "email": "ann@glow.com", "phone": "5125550100" }],
            "providers": [
                { "providerFullName": "Dr Kim", "email": "ann@glow.com", "selectedLocations": ["1 Main St"] },
                { "providerFullName": "Dr Roe", "email": "roe@glow.com", "selectedLocations": [] }
            ]
        }));
        let err = v.validate(Step::MultipleProvider, &data, false).unwrap_err();
        assert_eq!(
            err.iter().map(|e| e.field.as_str()).collect::<Vec<_>>(),
            vec!["providers[0].email", "providers[1].selectedLocations"]
        );
    }

    #[test]
    fn kits_reject_repeated_shipping_address() {
        let v = Validator::new().unwrap();
        let data = form(json!({
            "locations": [{ "streetAddress": "1 Main St", "city": "Austin", "state": "TX", "zipCode": "73301" }],
            "kits": [{ "shippingProvider": "Dr Kim", "shippingLocation": "1 Main St" }],
            "shippingFullLocations": [{ "streetAddress": "1 main st ", "city": "Austin", "state": "TX", "zipCode": "73301" }]
        }));
        assert_eq!(
            fields_of(v.validate(Step::Kits, &data, false)),
            vec!["shippingFullLocations[0].streetAddress"]
        );
    }

    #[test]
    fn commission_steps_of_half() {
        let v = Validator::new().unwrap();
        for ok in [json!(0), json!(12.5), json!("100")] {
            assert!(v.validate(Step::PracticeMarkup, &form(json!({"commission": ok})), false).is_ok());
        }
        for bad in [json!(12.3), json!(101), json!(-1), json!("ten")] {
            assert!(v.validate(Step::PracticeMarkup, &form(json!({"commission": bad})), false).is_err());
        }
    }

    #[test]
    fn hormone_ignores_surrounding_whitespace() {
        let v = Validator::new().unwrap();
        let data = form(json!({ "hormone": " Practice Will Pay for Hormones" }));
        assert!(v.validate(Step::Hormone, &data, false).is_ok());
        let data = form(json!({ "hormone": "Something else" }));
        assert!(v.validate(Step::Hormone, &data, false).is_err());
    }

    #[test]
    fn members_need_known_role_and_unique_email() {
        let v = Validator::new().unwrap();
        let data = form(json!({
            "email": "lead@glow.com",
            "providers": [{ "providerFullName": "Dr Kim", "email": "kim@glow.com", "selectedLocations": ["a"] }],
            "members": [{
                "staffName": "Sam Hill", "email": "kim@glow.com", "roles": ["Janitor"],
                "primaryDuties": "", "selectedLocations": ["a"]
            }]
        }));
        assert_eq!(
            fields_of(v.validate(Step::AdditionalMembers, &data, false)),
            vec!["members[0].email", "members[0].roles", "members[0].primaryDuties"]
        );
    }

    #[test]
    fn choice_steps_require_a_boolean() {
        let v = Validator::new().unwrap();
        assert!(v.validate(Step::SoleOwner, &form(json!({"isSoleOwner": false})), false).is_ok());
        assert!(v.validate(Step::SoleOwner, &form(json!({"isSoleOwner": "yes"})), false).is_err());
        assert!(v.validate(Step::AskMoreThanOneMember, &FormData::new(), false).is_err());
    }

    #[test]
    fn duplicates_groups_in_first_seen_order() {
        let keys = ["b", "a", "", "b", "a", ""].into_iter().map(str::to_owned);
        assert_eq!(duplicates(keys), vec![vec![0, 3], vec![1, 4]]);
    }
}
