//! The onboarding form as it travels between the browser, the server and the webhook.
//!
//! [`FormData`] keeps every key it was given, known or not, because the relay forwards the
//! bag verbatim. Typed views ([`Owner`], [`Location`], ...) are read on demand. Record
//! fields are read leniently (`null` or a wrong type reads as empty) and list entries that
//! are not objects read as empty records, so `records[i]` always lines up with the raw
//! array and the field rules see every entry.

use crate::constants::fields;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const REQUIRED_SCALARS: [&str; 6] = [
    fields::PRACTICE_NAME,
    fields::FULL_NAME,
    fields::PHONE,
    fields::EMAIL,
    fields::COMMISSION,
    fields::HORMONE,
];

const ALWAYS_LISTED: [&str; 3] = [fields::LOCATIONS, fields::PROVIDERS, fields::KITS];

/// Untyped key-value bag accumulated across wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(Map<String, Value>);

impl FormData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value as a string slice, if it is a JSON string.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The value as a trimmed string, `""` when absent or not a string.
    #[must_use]
    pub fn text(&self, key: &str) -> &str {
        self.str(key).map_or("", str::trim)
    }

    #[must_use]
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Loose truthiness as the browser evaluates it: `false`, `null`, `0`, `""`, missing
    /// are false; everything else, including empty arrays, is true.
    #[must_use]
    pub fn is_truthy(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(is_truthy)
    }

    /// Whether the field carries a usable value: present, not `null`, not `false`, and
    /// not a string that is empty after trimming. Numbers, including zero, count.
    #[must_use]
    pub fn is_filled(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null | Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Length of the field when it is an array.
    #[must_use]
    pub fn array_len(&self, key: &str) -> Option<usize> {
        self.0.get(key).and_then(Value::as_array).map(Vec::len)
    }

    /// `commission` as a number, accepting numeric strings.
    #[must_use]
    pub fn commission(&self) -> Option<f64> {
        match self.0.get(fields::COMMISSION)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn owners(&self) -> Vec<Owner> {
        self.records(fields::OWNERS)
    }

    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        self.records(fields::LOCATIONS)
    }

    #[must_use]
    pub fn providers(&self) -> Vec<Provider> {
        self.records(fields::PROVIDERS)
    }

    #[must_use]
    pub fn kits(&self) -> Vec<Kit> {
        self.records(fields::KITS)
    }

    #[must_use]
    pub fn members(&self) -> Vec<Member> {
        self.records(fields::MEMBERS)
    }

    #[must_use]
    pub fn shipping_locations(&self) -> Vec<Location> {
        self.records(fields::SHIPPING_FULL_LOCATIONS)
    }

    /// First field that keeps the form from being submitted, checked in the order
    /// scalars, `owners`, `locations`, `providers`, `kits`, `members`.
    ///
    /// Scalars must be [filled](Self::is_filled). `owners` must be a non-empty array when
    /// `isSoleOwner` is exactly `false`, `members` when `isMultipleMember` is truthy;
    /// `locations`, `providers` and `kits` always.
    #[must_use]
    pub fn first_missing_required(&self) -> Option<&'static str> {
        if let Some(field) = REQUIRED_SCALARS.into_iter().find(|f| !self.is_filled(f)) {
            return Some(field);
        }
        if self.0.get(fields::IS_SOLE_OWNER) == Some(&Value::Bool(false))
            && !self.has_entries(fields::OWNERS)
        {
            return Some(fields::OWNERS);
        }
        if let Some(field) = ALWAYS_LISTED.into_iter().find(|f| !self.has_entries(f)) {
            return Some(field);
        }
        if self.is_truthy(fields::IS_MULTIPLE_MEMBER) && !self.has_entries(fields::MEMBERS) {
            return Some(fields::MEMBERS);
        }
        None
    }

    fn has_entries(&self, key: &str) -> bool {
        self.array_len(key).is_some_and(|n| n > 0)
    }

    fn records<T: DeserializeOwned + Default>(&self, key: &str) -> Vec<T> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().map(|item| T::deserialize(item).unwrap_or_default()).collect())
            .unwrap_or_default()
    }
}

impl From<Map<String, Value>> for FormData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<FormData> for Value {
    fn from(form: FormData) -> Self {
        Self::Object(form.0)
    }
}

impl FromIterator<(String, Value)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Owner {
    #[serde(deserialize_with = "lenient::text")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub location_identifier: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub street_address: String,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub street_address_line2: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub city: String,
    #[serde(deserialize_with = "lenient::text")]
    pub state: String,
    #[serde(deserialize_with = "lenient::text")]
    pub zip_code: String,
}

impl Location {
    /// `street, [line 2, ]city, state, zip`, skipping blank parts.
    #[must_use]
    pub fn one_line(&self) -> String {
        [
            Some(self.street_address.as_str()),
            self.street_address_line2.as_deref(),
            Some(self.city.as_str()),
            Some(self.state.as_str()),
            Some(self.zip_code.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Provider {
    #[serde(deserialize_with = "lenient::text")]
    pub provider_full_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(deserialize_with = "lenient::texts")]
    pub selected_locations: Vec<String>,
    #[serde(deserialize_with = "lenient::locations", skip_serializing_if = "Vec::is_empty")]
    pub selected_full_locations: Vec<Location>,
}

/// Assignment of demonstration kits to a recipient and shipping address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Kit {
    #[serde(deserialize_with = "lenient::text")]
    pub shipping_provider: String,
    #[serde(deserialize_with = "lenient::text")]
    pub shipping_location: String,
    /// Recipient entered by hand rather than picked from the providers.
    #[serde(deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub is_custom_recipient: Option<bool>,
}

impl Kit {
    #[must_use]
    pub fn for_provider(name: impl Into<String>) -> Self {
        Self {
            shipping_provider: name.into(),
            shipping_location: String::new(),
            is_custom_recipient: Some(false),
        }
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.is_custom_recipient == Some(true)
    }
}

/// Team member requesting Operations Hub access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Member {
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(deserialize_with = "lenient::texts")]
    pub roles: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub primary_duties: String,
    #[serde(deserialize_with = "lenient::texts")]
    pub selected_locations: Vec<String>,
    #[serde(deserialize_with = "lenient::locations", skip_serializing_if = "Vec::is_empty")]
    pub selected_full_locations: Vec<Location>,
}

/// Record field readers that coerce odd values to empty ones instead of failing.
mod lenient {
    use super::Location;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar(Value::deserialize(d)?).unwrap_or_default())
    }

    pub(super) fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar(Value::deserialize(d)?))
    }

    pub(super) fn texts<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.into_iter().filter_map(scalar).collect(),
            _ => Vec::new(),
        })
    }

    pub(super) fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(Value::deserialize(d)?.as_bool())
    }

    pub(super) fn locations<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Location>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => {
                items.iter().map(|item| Location::deserialize(item).unwrap_or_default()).collect()
            },
            _ => Vec::new(),
        })
    }
}

/// An uploaded file carried inside the JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub mimetype: String,
    /// Base64 (standard alphabet, padded).
    pub file_data: String,
}

/// What the relay posts to the webhook: the form bag plus the two uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayPayload {
    #[serde(flatten)]
    pub form: FormData,
    pub logo: Attachment,
    pub pdf: Attachment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> FormData {
        serde_json::from_value(value).expect("object")
    }

    #[test]
    fn filled_follows_relay_rules() {
        let data = form(json!({
            "a": "  ", "b": false, "c": null, "d": 0, "e": "x", "f": [], "g": true
        }));
        assert!(!data.is_filled("a"));
        assert!(!data.is_filled("b"));
        assert!(!data.is_filled("c"));
        assert!(data.is_filled("d"));
        assert!(data.is_filled("e"));
        assert!(data.is_filled("f"));
        assert!(data.is_filled("g"));
        assert!(!data.is_filled("missing"));
    }

    #[test]
    fn truthiness_matches_browser() {
        let data = form(json!({ "zero": 0, "empty": "", "arr": [], "yes": "false" }));
        assert!(!data.is_truthy("zero"));
        assert!(!data.is_truthy("empty"));
        assert!(data.is_truthy("arr"));
        assert!(data.is_truthy("yes"));
        assert!(!data.is_truthy("missing"));
    }

    #[test]
    fn commission_accepts_numeric_strings() {
        assert_eq!(form(json!({ "commission": "12.5" })).commission(), Some(12.5));
        assert_eq!(form(json!({ "commission": 10 })).commission(), Some(10.0));
        assert_eq!(form(json!({ "commission": "ten" })).commission(), None);
    }

    #[test]
    fn records_keep_malformed_entries_in_place() {
        let data = form(json!({
            "owners": [
                42,
                { "fullName": null, "email": ["x"], "phone": 5125550100_u64 },
                { "fullName": "Ann Lee", "email": "a@b.com", "phone": "1" }
            ]
        }));
        let owners = data.owners();
        assert_eq!(owners.len(), 3);
        assert_eq!(owners[0], Owner::default());
        assert_eq!(owners[1].full_name, "");
        assert_eq!(owners[1].email, "");
        assert_eq!(owners[1].phone, "5125550100");
        assert_eq!(owners[2].full_name, "Ann Lee");
    }

    #[test]
    fn odd_nested_values_read_as_empty() {
        let data = form(json!({
            "providers": [{
                "providerFullName": "Dr Kim",
                "selectedLocations": "Main",
                "selectedFullLocations": [null, { "city": "Austin", "zipCode": 73301 }]
            }],
            "kits": [{ "shippingProvider": "Front Desk", "shippingLocation": null, "isCustomRecipient": "yes" }]
        }));

        let provider = &data.providers()[0];
        assert!(provider.selected_locations.is_empty());
        assert_eq!(provider.selected_full_locations.len(), 2);
        assert_eq!(provider.selected_full_locations[1].zip_code, "73301");

        let kit = &data.kits()[0];
        assert_eq!(kit.shipping_location, "");
        assert_eq!(kit.is_custom_recipient, None);
    }

    fn complete() -> FormData {
        form(json!({
            "practiceName": "Glow Clinic", "fullName": "Ann Lee", "phone": "5125550100",
            "email": "ann@glow.com", "commission": 0, "hormone": "Practice Will Pay for Hormones",
            "isSoleOwner": true, "isMultipleMember": false,
            "locations": [{}], "providers": [{}], "kits": [{}]
        }))
    }

    #[test]
    fn required_fields_in_order() {
        assert_eq!(complete().first_missing_required(), None);

        let mut data = complete();
        data.insert("practiceName", " ");
        data.remove("kits");
        assert_eq!(data.first_missing_required(), Some("practiceName"));

        let mut data = complete();
        data.insert("isSoleOwner", false);
        assert_eq!(data.first_missing_required(), Some("owners"));

        let mut data = complete();
        data.insert("isMultipleMember", true);
        data.insert("members", json!([]));
        assert_eq!(data.first_missing_required(), Some("members"));

        let mut data = complete();
        data.insert("providers", json!("[]"));
        assert_eq!(data.first_missing_required(), Some("providers"));
    }

    #[test]
    fn location_one_line_skips_blanks() {
        let location = Location {
            street_address: "1 Main St".into(),
            street_address_line2: Some(" ".into()),
            city: "Austin".into(),
            state: "TX".into(),
            zip_code: "73301".into(),
            ..Location::default()
        };
        assert_eq!(location.one_line(), "1 Main St, Austin, TX, 73301");
    }

    #[test]
    fn payload_flattens_form_keys() {
        let attachment = Attachment {
            filename: "logo.png".into(),
            mimetype: "image/png".into(),
            file_data: "AA==".into(),
        };
        let payload = RelayPayload {
            form: form(json!({ "practiceName": "Glow" })),
            logo: attachment.clone(),
            pdf: attachment,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["practiceName"], "Glow");
        assert_eq!(value["logo"]["fileData"], "AA==");
    }
}
