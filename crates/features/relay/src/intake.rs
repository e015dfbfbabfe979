//! Turning the multipart fields of a submission into the form bag and its two uploads.

use crate::error::{RelayError, RelayErrorExt};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use brite_domain::constants::fields;
use brite_domain::submission::{Attachment, FormData, RelayPayload};
use serde_json::Value;

/// An uploaded file as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub mimetype: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    #[must_use]
    pub fn to_attachment(&self) -> Attachment {
        Attachment {
            filename: self.filename.clone(),
            mimetype: self.mimetype.clone(),
            file_data: STANDARD.encode(&self.bytes),
        }
    }
}

/// A submission being assembled from multipart fields.
#[derive(Debug, Default, Clone)]
pub struct Submission {
    pub form: FormData,
    pub logo: Option<Upload>,
    pub pdf: Option<Upload>,
}

impl Submission {
    /// Whether `name` is carried as a file rather than text.
    #[must_use]
    pub fn is_file_field(name: &str) -> bool {
        name == fields::LOGO || name == fields::PDF
    }

    /// Adds a text field: list fields are parsed as JSON (empty means `[]`), flags are
    /// `true` only for the exact text `"true"`, everything else stays a string.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Json`] when a list field is not valid JSON.
    pub fn add_text(&mut self, name: &str, text: &str) -> Result<(), RelayError> {
        let value = if fields::JSON_ARRAYS.contains(&name) {
            let source = if text.is_empty() { "[]" } else { text };
            serde_json::from_str::<Value>(source).context(name.to_owned())?
        } else if fields::FLAGS.contains(&name) {
            Value::Bool(text == "true")
        } else {
            Value::String(text.to_owned())
        };

        self.form.insert(name, value);
        Ok(())
    }

    /// Keeps the first `logo` and `pdf` upload; other names are ignored.
    pub fn add_file(&mut self, name: &str, upload: Upload) {
        let slot = match name {
            fields::LOGO => &mut self.logo,
            fields::PDF => &mut self.pdf,
            _ => {
                tracing::debug!(field = name, "Ignoring unexpected file field");
                return;
            },
        };
        if slot.is_none() {
            *slot = Some(upload);
        }
    }

    /// The submission as JSON, with whichever uploads are present.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = self.form.as_map().clone();
        for (key, upload) in [(fields::LOGO, &self.logo), (fields::PDF, &self.pdf)] {
            if let Some(value) = upload.as_ref().and_then(|u| serde_json::to_value(u.to_attachment()).ok()) {
                map.insert(key.to_owned(), value);
            }
        }
        Value::Object(map)
    }

    /// # Errors
    ///
    /// Returns [`RelayError::InvalidForm`] when the logo or the contract PDF is missing.
    pub fn into_payload(self) -> Result<RelayPayload, RelayError> {
        let missing = |field: &'static str| RelayError::InvalidForm { message: format!("missing {field} file").into(), context: None };
        let logo = self.logo.ok_or_else(|| missing(fields::LOGO))?;
        let pdf = self.pdf.ok_or_else(|| missing(fields::PDF))?;

        Ok(RelayPayload { form: self.form, logo: logo.to_attachment(), pdf: pdf.to_attachment() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upload(name: &str) -> Upload {
        Upload { filename: name.to_owned(), mimetype: "image/png".to_owned(), bytes: b"hi".to_vec() }
    }

    #[test]
    fn text_fields_follow_intake_rules() {
        let mut submission = Submission::default();
        submission.add_text("locations", r#"[{"city":"Austin"}]"#).unwrap();
        submission.add_text("members", "").unwrap();
        submission.add_text("isSoleOwner", "true").unwrap();
        submission.add_text("isMultipleMember", "TRUE").unwrap();
        submission.add_text("commission", "12.5").unwrap();

        assert_eq!(submission.form.get("locations"), Some(&json!([{ "city": "Austin" }])));
        assert_eq!(submission.form.get("members"), Some(&json!([])));
        assert_eq!(submission.form.get("isSoleOwner"), Some(&json!(true)));
        assert_eq!(submission.form.get("isMultipleMember"), Some(&json!(false)));
        assert_eq!(submission.form.get("commission"), Some(&json!("12.5")));
    }

    #[test]
    fn malformed_list_is_rejected() {
        let mut submission = Submission::default();
        let err = submission.add_text("kits", "[{").unwrap_err();
        assert!(matches!(err, RelayError::Json { .. }));
    }

    #[test]
    fn first_upload_wins() {
        let mut submission = Submission::default();
        submission.add_file("logo", upload("a.png"));
        submission.add_file("logo", upload("b.png"));
        submission.add_file("avatar", upload("c.png"));
        assert_eq!(submission.logo.as_ref().map(|u| u.filename.as_str()), Some("a.png"));
    }

    #[test]
    fn payload_embeds_base64_attachments() {
        let mut submission = Submission::default();
        submission.add_text("practiceName", "Glow").unwrap();
        submission.add_file("logo", upload("logo.png"));
        assert!(matches!(submission.clone().into_payload(), Err(RelayError::InvalidForm { .. })));

        submission.add_file("pdf", Upload { filename: "c.pdf".into(), mimetype: "application/pdf".into(), bytes: b"%PDF".to_vec() });
        let value = serde_json::to_value(submission.into_payload().unwrap()).unwrap();
        assert_eq!(value["practiceName"], "Glow");
        assert_eq!(value["logo"], json!({ "filename": "logo.png", "mimetype": "image/png", "fileData": "aGk=" }));
        assert_eq!(value["pdf"]["fileData"], "JVBERg==");
    }

    #[test]
    fn value_includes_present_uploads_only() {
        let mut submission = Submission::default();
        submission.add_file("pdf", upload("c.pdf"));
        let value = submission.to_value();
        assert!(value.get("logo").is_none());
        assert_eq!(value["pdf"]["filename"], "c.pdf");
    }
}
