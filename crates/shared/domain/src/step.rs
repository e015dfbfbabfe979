//! Wizard step identifiers.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, FromRepr, IntoStaticStr};

pub const TOTAL_STEPS: u8 = 19;

/// One screen of the onboarding wizard, numbered as the browser client numbers them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    FromRepr,
    IntoStaticStr,
)]
#[repr(u8)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Step {
    PracticeName = 1,
    PracticeLogo = 2,
    FaxNumber = 3,
    FullName = 4,
    ContactNumber = 5,
    EmailAddress = 6,
    SoleOwner = 7,
    AdditionalOwner = 8,
    MultipleLocations = 9,
    MultipleProvider = 10,
    Kits = 11,
    PricingModal = 12,
    PracticeMarkup = 13,
    Hormone = 14,
    OperationHubMessage = 15,
    AskMoreThanOneMember = 16,
    AdditionalMembers = 17,
    Contract = 18,
    CardVerification = 19,
}

impl Step {
    pub const FIRST: Self = Self::PracticeName;
    pub const LAST: Self = Self::CardVerification;

    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        Self::from_repr(number)
    }

    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Machine name, e.g. `practiceMarkup`.
    #[must_use]
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Heading shown on the screen.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::PracticeName => "Practice Name",
            Self::PracticeLogo => "Upload your Practice Logo",
            Self::FaxNumber => "Practice Fax Number",
            Self::FullName => "Practice Owner's Full Name",
            Self::ContactNumber => "Practice Owner's Phone Number",
            Self::EmailAddress => "Practice Owner's Email",
            Self::SoleOwner => "Are you the sole owner, or is there more than one owner?",
            Self::AdditionalOwner => "Additional Practice Owner(s) Information",
            Self::MultipleLocations => "Location(s) Information",
            Self::MultipleProvider => "Provider(s) Information",
            Self::Kits => "BRITE Provider Demonstration Kits",
            Self::PricingModal => "BRITE Pricing Model",
            Self::PracticeMarkup => "Enable LabCorp Test Ordering & Set Your Practice Markup",
            Self::Hormone => "In addition to hormones, what will your practice pay for?",
            Self::OperationHubMessage => "Introduction to the Operations Hub",
            Self::AskMoreThanOneMember => {
                "Do you have additional team members who need operations hub portal access?"
            },
            Self::AdditionalMembers => "Operation Hub: Team Member Access",
            Self::Contract => "BRITE-PROVIDER AGREEMENT",
            Self::CardVerification => "Card Verification",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn numbers_are_contiguous() {
        let numbers: Vec<u8> = Step::iter().map(Step::number).collect();
        assert_eq!(numbers, (1..=TOTAL_STEPS).collect::<Vec<_>>());
    }

    #[test]
    fn from_number_rejects_out_of_range() {
        assert_eq!(Step::from_number(0), None);
        assert_eq!(Step::from_number(20), None);
        assert_eq!(Step::from_number(13), Some(Step::PracticeMarkup));
    }

    #[test]
    fn keys_are_camel_case() {
        assert_eq!(Step::AskMoreThanOneMember.key(), "askMoreThanOneMember");
        assert_eq!(Step::FIRST.key(), "practiceName");
    }
}
