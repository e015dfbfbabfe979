//! Minimal PDF 1.4 object writer.

use crate::error::ContractError;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ObjectId(usize);

impl ObjectId {
    pub(crate) fn reference(self) -> String {
        format!("{} 0 R", self.0)
    }
}

/// Collects numbered objects and serializes them with a cross-reference table.
#[derive(Debug, Default)]
pub(crate) struct PdfWriter {
    objects: Vec<Option<Vec<u8>>>,
}

impl PdfWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocates an id to be filled later with [`Self::set`].
    pub(crate) fn reserve(&mut self) -> ObjectId {
        self.objects.push(None);
        ObjectId(self.objects.len())
    }

    pub(crate) fn set(&mut self, id: ObjectId, body: impl Into<Vec<u8>>) {
        if let Some(slot) = self.objects.get_mut(id.0 - 1) {
            *slot = Some(body.into());
        }
    }

    pub(crate) fn add(&mut self, body: impl Into<Vec<u8>>) -> ObjectId {
        self.objects.push(Some(body.into()));
        ObjectId(self.objects.len())
    }

    /// Adds a stream object; `dict` holds the entries besides `/Length`.
    pub(crate) fn add_stream(&mut self, dict: &str, data: &[u8]) -> ObjectId {
        let mut body = format!("<< {dict} /Length {} >>\nstream\n", data.len()).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.add(body)
    }

    /// Serializes the document.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Internal`] if a reserved object was never set.
    pub(crate) fn finish(self, root: ObjectId, info: ObjectId) -> Result<Vec<u8>, ContractError> {
        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(self.objects.len());

        for (index, object) in self.objects.into_iter().enumerate() {
            let body = object.ok_or_else(|| ContractError::Internal {
                message: format!("PDF object {} was reserved but never written", index + 1).into(),
                context: None,
            })?;
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
            out.extend_from_slice(&body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
        for offset in &offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = writeln!(
            xref,
            "trailer\n<< /Size {} /Root {} /Info {} >>\nstartxref\n{xref_offset}\n%%EOF",
            offsets.len() + 1,
            root.reference(),
            info.reference(),
        );
        out.extend_from_slice(xref.as_bytes());

        Ok(out)
    }
}

/// A PDF literal string, `(...)`, with delimiters escaped and non-printable bytes in
/// octal.
pub(crate) fn literal(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(b'(');
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => out.extend_from_slice(&[b'\\', b]),
            0x20..=0x7E => out.push(b),
            _ => out.extend_from_slice(format!("\\{b:03o}").as_bytes()),
        }
    }
    out.push(b')');
    out
}

/// Formats a coordinate with at most two decimals.
pub(crate) fn num(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_owned() } else { text.to_owned() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xref_points_at_objects() {
        let mut writer = PdfWriter::new();
        let root = writer.reserve();
        let info = writer.add("<< /Producer (test) >>");
        writer.set(root, "<< /Type /Catalog >>");
        let pdf = writer.finish(root, info).unwrap();
        let find = |needle: &[u8]| pdf.windows(needle.len()).position(|w| w == needle).unwrap();

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        let first = find(b"1 0 obj");
        let second = find(b"2 0 obj");
        find(format!("{first:010} 00000 n \n{second:010} 00000 n \n").as_bytes());
    }

    #[test]
    fn unset_objects_are_an_error() {
        let mut writer = PdfWriter::new();
        let root = writer.reserve();
        let info = writer.reserve();
        writer.set(root, "<< >>");
        assert!(writer.finish(root, info).is_err());
    }

    #[test]
    fn literals_escape_delimiters() {
        assert_eq!(literal(b"a(b)\\"), b"(a\\(b\\)\\\\)".to_vec());
        assert_eq!(literal(b"\xAE"), b"(\\256)".to_vec());
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(48.0), "48");
        assert_eq!(num(595.28), "595.28");
        assert_eq!(num(12.5), "12.5");
        assert_eq!(num(-0.001), "0");
    }
}
