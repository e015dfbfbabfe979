use crate::error::ContractError;
use crate::image::SignatureImage;
use crate::template::{EFFECTIVE_DATE, PRACTICE_ADDRESS, PRACTICE_NAME};
use brite_domain::constants::fields;
use brite_domain::submission::{FormData, Location};
use chrono::{Local, NaiveDate};

/// The per-practice values printed into the agreement.
#[derive(Debug, Clone)]
pub struct ContractData {
    pub practice_name: String,
    pub signer_name: String,
    /// First practice location on one line.
    pub practice_address: String,
    pub effective_date: NaiveDate,
    pub signature: Option<SignatureImage>,
}

impl ContractData {
    /// Collects the agreement values from the wizard answers, dated today.
    ///
    /// `signature` takes precedence over the form's own `signature` field; both are
    /// image data URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Image`] or [`ContractError::Base64`] when the signature
    /// cannot be decoded.
    pub fn from_form(form: &FormData, signature: Option<&str>) -> Result<Self, ContractError> {
        let signature = signature
            .or_else(|| form.str(fields::SIGNATURE))
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(SignatureImage::from_data_url)
            .transpose()?;

        Ok(Self {
            practice_name: form.text(fields::PRACTICE_NAME).trim().to_owned(),
            signer_name: form.text(fields::FULL_NAME).trim().to_owned(),
            practice_address: form.locations().first().map(Location::one_line).unwrap_or_default(),
            effective_date: Local::now().date_naive(),
            signature,
        })
    }

    #[must_use]
    pub fn with_effective_date(mut self, date: NaiveDate) -> Self {
        self.effective_date = date;
        self
    }

    /// `MM-DD-YYYY`, the form used throughout the agreement.
    #[must_use]
    pub fn formatted_date(&self) -> String {
        self.effective_date.format("%m-%d-%Y").to_string()
    }

    pub(crate) fn placeholders(&self) -> [(&'static str, String); 3] {
        [
            (EFFECTIVE_DATE, self.formatted_date()),
            (PRACTICE_NAME, self.practice_name.clone()),
            (PRACTICE_ADDRESS, self.practice_address.clone()),
        ]
    }
}
