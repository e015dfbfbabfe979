//! Shared string constants: `OpenAPI` tags, headers and form field names.

pub const SYSTEM_TAG: &str = "System";
pub const WIZARD_TAG: &str = "Wizard";
pub const PAYMENT_TAG: &str = "Payment";
pub const CONTRACT_TAG: &str = "Contract";
pub const RELAY_TAG: &str = "Relay";

/// Header carrying the checkout session id on the final submission.
pub const SESSION_HEADER: &str = "x-session-id";

/// Maximum accepted request body (multipart submissions carry a logo and a PDF).
pub const BODY_LIMIT_BYTES: usize = 20 * 1024 * 1024;

pub mod fields {
    pub const PRACTICE_NAME: &str = "practiceName";
    pub const FAX: &str = "fax";
    /// Key the browser client stores the fax under; read when `fax` is blank.
    pub const FAX_NUMBER: &str = "faxNumber";
    pub const FULL_NAME: &str = "fullName";
    pub const PHONE: &str = "phone";
    pub const EMAIL: &str = "email";
    pub const IS_SOLE_OWNER: &str = "isSoleOwner";
    pub const OWNERS: &str = "owners";
    pub const LOCATIONS: &str = "locations";
    pub const PROVIDERS: &str = "providers";
    pub const KITS: &str = "kits";
    pub const IS_PRICING_ACKNOWLEDGED: &str = "isPricingAcknowledged";
    pub const COMMISSION: &str = "commission";
    pub const HORMONE: &str = "hormone";
    pub const IS_OPERATION_HUB_ACKNOWLEDGED: &str = "isOperationHubAcknowledged";
    pub const IS_MULTIPLE_MEMBER: &str = "isMultipleMember";
    pub const MEMBERS: &str = "members";
    pub const SHIPPING_FULL_LOCATIONS: &str = "shippingFullLocations";
    pub const SIGNATURE: &str = "signature";
    pub const LOGO: &str = "logo";
    pub const PDF: &str = "pdf";

    /// Multipart text fields that carry JSON arrays.
    pub const JSON_ARRAYS: [&str; 5] = [LOCATIONS, PROVIDERS, KITS, MEMBERS, OWNERS];

    /// Multipart text fields that carry booleans (`"true"` or anything else).
    pub const FLAGS: [&str; 2] = [IS_SOLE_OWNER, IS_MULTIPLE_MEMBER];
}
