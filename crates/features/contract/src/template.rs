//! The agreement text and its light markup.
//!
//! Blocks are separated by blank lines. A block starting with `= ` is the title, `## ` a
//! section heading, `> ` an indented paragraph and `! ` the closing line; anything else is
//! a plain paragraph. `**` toggles bold and `{name}` marks a value filled per practice.

use crate::error::ContractError;

const AGREEMENT: &str = include_str!("../templates/agreement.txt");

pub const EFFECTIVE_DATE: &str = "effective_date";
pub const PRACTICE_NAME: &str = "practice_name";
pub const PRACTICE_ADDRESS: &str = "practice_address";

const PLACEHOLDERS: [&str; 3] = [EFFECTIVE_DATE, PRACTICE_NAME, PRACTICE_ADDRESS];

/// A run of text in one weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Heading(String),
    Paragraph(Vec<Span>),
    Indented(Vec<Span>),
    Closing(Vec<Span>),
}

/// Parsed agreement, ready to be filled for a practice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    blocks: Vec<Block>,
}

impl Template {
    /// The BRITE-Provider agreement shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Template`] if the embedded text is malformed.
    pub fn agreement() -> Result<Self, ContractError> {
        Self::parse(AGREEMENT)
    }

    /// # Errors
    ///
    /// Returns [`ContractError::Template`] for unbalanced `**` markers and unknown or
    /// unterminated placeholders.
    pub fn parse(source: &str) -> Result<Self, ContractError> {
        let mut blocks = Vec::new();

        for (index, raw) in paragraphs(source).into_iter().enumerate() {
            check_placeholders(&raw).map_err(|message| ContractError::Template {
                message: message.into(),
                context: Some(format!("block {}", index + 1).into()),
            })?;

            let block = if let Some(title) = raw.strip_prefix("= ") {
                Block::Title(title.trim().to_owned())
            } else if let Some(heading) = raw.strip_prefix("## ") {
                Block::Heading(heading.trim().to_owned())
            } else if let Some(text) = raw.strip_prefix("> ") {
                Block::Indented(spans(text, index)?)
            } else if let Some(text) = raw.strip_prefix("! ") {
                Block::Closing(spans(text, index)?)
            } else {
                Block::Paragraph(spans(&raw, index)?)
            };
            blocks.push(block);
        }

        Ok(Self { blocks })
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The blocks with every `{name}` replaced by its value; unmatched names become empty.
    #[must_use]
    pub fn fill(&self, values: &[(&str, &str)]) -> Vec<Block> {
        let fill_spans = |spans: &[Span]| -> Vec<Span> {
            spans
                .iter()
                .map(|s| Span { text: substitute(&s.text, values), bold: s.bold })
                .collect()
        };

        self.blocks
            .iter()
            .map(|block| match block {
                Block::Title(text) => Block::Title(substitute(text, values)),
                Block::Heading(text) => Block::Heading(substitute(text, values)),
                Block::Paragraph(spans) => Block::Paragraph(fill_spans(spans)),
                Block::Indented(spans) => Block::Indented(fill_spans(spans)),
                Block::Closing(spans) => Block::Closing(fill_spans(spans)),
            })
            .collect()
    }
}

/// Non-empty blocks with their lines joined by single spaces.
fn paragraphs(source: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in source.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join(" "));
    }
    blocks
}

fn spans(text: &str, index: usize) -> Result<Vec<Span>, ContractError> {
    let parts: Vec<&str> = text.split("**").collect();
    if parts.len() % 2 == 0 {
        return Err(ContractError::Template {
            message: "unbalanced ** marker".into(),
            context: Some(format!("block {}", index + 1).into()),
        });
    }

    Ok(parts
        .into_iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| Span { text: part.to_owned(), bold: i % 2 == 1 })
        .collect())
}

fn check_placeholders(text: &str) -> Result<(), String> {
    let mut rest = text;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            return Err("unterminated placeholder".to_owned());
        };
        let name = &after[..end];
        if !PLACEHOLDERS.contains(&name) {
            return Err(format!("unknown placeholder {{{name}}}"));
        }
        rest = &after[end + 1..];
    }
    Ok(())
}

fn substitute(text: &str, values: &[(&str, &str)]) -> String {
    if !text.contains('{') {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        if let Some((_, value)) = values.iter().find(|(key, _)| *key == name) {
            out.push_str(value);
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}
