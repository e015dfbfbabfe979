//! Page composition: turns agreement blocks into PDF content streams.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner. The composer
//! keeps a baseline cursor that moves down the page; anything that would cross
//! [`CONTENT_BOTTOM`] starts a new page. Footers are stamped once the page count is known.

use crate::fonts::{Font, encode};
use crate::pdf::{literal, num};
use crate::template::{Block, Span};
use std::mem;

pub(crate) const PAGE_WIDTH: f64 = 595.28;
pub(crate) const PAGE_HEIGHT: f64 = 841.89;
const MARGIN: f64 = 48.0;
const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

const BODY_SIZE: f64 = 10.0;
const BODY_LEADING: f64 = 12.0;
const PARAGRAPH_GAP: f64 = 12.0;
const INDENT: f64 = 24.0;
const TITLE_SIZE: f64 = 16.0;
const TITLE_GAP: f64 = 24.0;
const HEADING_SIZE: f64 = 12.0;
const HEADING_GAP_ABOVE: f64 = 16.0;
const HEADING_GAP_BELOW: f64 = 8.0;

const FOOTER_SIZE: f64 = 8.0;
const FOOTER_LEADING: f64 = 9.0;
const FOOTER_BOTTOM: f64 = 40.0;
const FOOTER_RIGHT: f64 = PAGE_WIDTH - 72.0;
pub(crate) const FOOTER_LINES: [&str; 2] = ["BRITE-PROVIDER AGREEMENT", "Rev. Date May 2, 2025"];
const CONTENT_BOTTOM: f64 = FOOTER_BOTTOM + 3.0 * FOOTER_LEADING + 10.0;

const SIGNATURE_TITLE_SIZE: f64 = 12.0;
const SIGNATURE_TEXT_SIZE: f64 = 9.0;
const SIGNATURE_LEADING: f64 = 13.0;
pub(crate) const SIGNATURE_WIDTH: f64 = 120.0;
pub(crate) const SIGNATURE_HEIGHT: f64 = 64.0;
const SIGNATURE_LINE_WIDTH: f64 = 160.0;
const SIGNATURE_SECTION_GAP: f64 = 32.0;
/// Tallest column: title, two lines, image box, three lines.
const SIGNATURE_SECTION_HEIGHT: f64 =
    SIGNATURE_TITLE_SIZE + 8.0 + 2.0 * SIGNATURE_LEADING + SIGNATURE_HEIGHT + 4.0 + 3.0 * SIGNATURE_LEADING;

/// Uncompressed content stream of one page.
#[derive(Debug, Default)]
pub(crate) struct Page {
    pub(crate) content: Vec<u8>,
}

/// An image XObject placed in a signature box.
#[derive(Debug, Clone)]
pub(crate) struct ImageSlot {
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// One side of the signature section.
#[derive(Debug)]
pub(crate) struct SignatureColumn {
    pub(crate) title: &'static str,
    pub(crate) above: Vec<String>,
    pub(crate) image: Option<ImageSlot>,
    /// Printed under the ruled line when there is no image.
    pub(crate) placeholder: &'static str,
    pub(crate) below: Vec<String>,
}

#[derive(Debug)]
struct Fragment {
    font: Font,
    text: String,
    width: f64,
}

#[derive(Debug, Default)]
struct Word {
    fragments: Vec<Fragment>,
    width: f64,
}

#[derive(Debug)]
pub(crate) struct Composer {
    pages: Vec<Page>,
    page: Page,
    /// Baseline of the last line drawn, or the top margin on a fresh page.
    y: f64,
}

impl Composer {
    pub(crate) fn new() -> Self {
        Self { pages: Vec::new(), page: Page::default(), y: PAGE_HEIGHT - MARGIN }
    }

    pub(crate) fn block(&mut self, block: &Block) {
        match block {
            Block::Title(text) => {
                self.room(TITLE_SIZE);
                self.y -= TITLE_SIZE;
                let x = (PAGE_WIDTH - Font::Bold.width(text, TITLE_SIZE)) / 2.0;
                self.text(Font::Bold, TITLE_SIZE, x, self.y, text);
                self.y -= TITLE_GAP - PARAGRAPH_GAP;
            },
            Block::Heading(text) => {
                // Keep the heading with the first two lines that follow it.
                self.room(HEADING_GAP_ABOVE + HEADING_SIZE + HEADING_GAP_BELOW + 2.0 * BODY_LEADING);
                if !self.at_top() {
                    self.y -= HEADING_GAP_ABOVE - PARAGRAPH_GAP;
                }
                self.y -= HEADING_SIZE;
                self.text(Font::Bold, HEADING_SIZE, MARGIN, self.y, text);
                self.y -= HEADING_GAP_BELOW - 2.0;
            },
            Block::Paragraph(spans) => self.paragraph(spans, 0.0, true),
            Block::Indented(spans) => self.paragraph(spans, INDENT, true),
            Block::Closing(spans) => self.paragraph(spans, 0.0, false),
        }
    }

    /// Draws both signature columns side by side, moving to a new page if they do not fit.
    pub(crate) fn signatures(&mut self, columns: &[SignatureColumn; 2]) {
        self.y -= SIGNATURE_SECTION_GAP - PARAGRAPH_GAP;
        self.room(SIGNATURE_SECTION_HEIGHT);

        let top = self.y;
        let column_width = CONTENT_WIDTH / 2.0;
        let mut lowest = top;

        for (index, column) in columns.iter().enumerate() {
            let x = MARGIN + column_width * index as f64;
            let mut y = top - SIGNATURE_TITLE_SIZE;
            self.text(Font::Bold, SIGNATURE_TITLE_SIZE, x, y, column.title);
            y -= 4.0;

            for line in &column.above {
                y -= SIGNATURE_LEADING;
                self.text(Font::Regular, SIGNATURE_TEXT_SIZE, x, y, line);
            }

            y -= 4.0 + SIGNATURE_HEIGHT;
            match &column.image {
                Some(slot) => {
                    let (width, height) = fit(slot.width, slot.height);
                    self.image(&slot.name, x, y + SIGNATURE_HEIGHT - height, width, height);
                },
                None => {
                    self.rule(x, y + 12.0, SIGNATURE_LINE_WIDTH);
                    let label_x = x + (SIGNATURE_LINE_WIDTH - Font::Regular.width(column.placeholder, 8.0)) / 2.0;
                    self.text(Font::Regular, 8.0, label_x, y + 2.0, column.placeholder);
                },
            }

            for line in &column.below {
                y -= SIGNATURE_LEADING;
                self.text(Font::Regular, SIGNATURE_TEXT_SIZE, x, y, line);
            }
            lowest = lowest.min(y);
        }

        self.y = lowest;
    }

    /// Closes the last page and stamps `Page N` footers.
    pub(crate) fn finish(mut self) -> Vec<Page> {
        if !self.page.content.is_empty() || self.pages.is_empty() {
            self.pages.push(mem::take(&mut self.page));
        }

        for (index, page) in self.pages.iter_mut().enumerate() {
            let number = format!("Page {}", index + 1);
            let lines = [FOOTER_LINES[0], FOOTER_LINES[1], number.as_str()];
            for (row, line) in lines.iter().enumerate() {
                let y = FOOTER_BOTTOM + FOOTER_LEADING * (lines.len() - 1 - row) as f64;
                let x = FOOTER_RIGHT - Font::Regular.width(line, FOOTER_SIZE);
                write_text(&mut page.content, Font::Regular, FOOTER_SIZE, x, y, line);
            }
        }

        self.pages
    }

    fn at_top(&self) -> bool {
        (self.y - (PAGE_HEIGHT - MARGIN)).abs() < f64::EPSILON
    }

    /// Starts a new page unless `height` more points fit above the footer.
    fn room(&mut self, height: f64) {
        if self.y - height < CONTENT_BOTTOM && !self.at_top() {
            self.pages.push(mem::take(&mut self.page));
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn paragraph(&mut self, spans: &[Span], indent: f64, justify: bool) {
        let width = CONTENT_WIDTH - indent;
        let space = Font::Regular.width(" ", BODY_SIZE);
        let lines = break_lines(words(spans), width, space);
        let count = lines.len();

        for (index, line) in lines.iter().enumerate() {
            self.room(BODY_LEADING);
            self.y -= BODY_LEADING;

            let gap = if justify && index + 1 < count && line.len() > 1 {
                let natural: f64 = line.iter().map(|w| w.width).sum::<f64>() + space * (line.len() - 1) as f64;
                space + (width - natural) / (line.len() - 1) as f64
            } else {
                space
            };

            let mut x = MARGIN + indent;
            for word in line {
                for fragment in &word.fragments {
                    self.text(fragment.font, BODY_SIZE, x, self.y, &fragment.text);
                    x += fragment.width;
                }
                x += gap;
            }
        }

        self.y -= PARAGRAPH_GAP - (BODY_LEADING - BODY_SIZE);
    }

    fn text(&mut self, font: Font, size: f64, x: f64, y: f64, text: &str) {
        write_text(&mut self.page.content, font, size, x, y, text);
    }

    fn rule(&mut self, x: f64, y: f64, width: f64) {
        let ops = format!("0.75 w {} {} m {} {} l S\n", num(x), num(y), num(x + width), num(y));
        self.page.content.extend_from_slice(ops.as_bytes());
    }

    fn image(&mut self, name: &str, x: f64, y: f64, width: f64, height: f64) {
        let ops = format!("q {} 0 0 {} {} {} cm /{name} Do Q\n", num(width), num(height), num(x), num(y));
        self.page.content.extend_from_slice(ops.as_bytes());
    }
}

fn write_text(content: &mut Vec<u8>, font: Font, size: f64, x: f64, y: f64, text: &str) {
    content.extend_from_slice(format!("BT /{} {} Tf {} {} Td ", font.resource(), num(size), num(x), num(y)).as_bytes());
    content.extend_from_slice(&literal(&encode(text)));
    content.extend_from_slice(b" Tj ET\n");
}

/// Scales an image to fit the signature box, keeping its aspect ratio.
fn fit(width: u32, height: u32) -> (f64, f64) {
    let (w, h) = (f64::from(width.max(1)), f64::from(height.max(1)));
    let scale = (SIGNATURE_WIDTH / w).min(SIGNATURE_HEIGHT / h);
    (w * scale, h * scale)
}

/// Splits spans into whitespace-separated words; one word may mix weights.
fn words(spans: &[Span]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = Word::default();

    for span in spans {
        let font = if span.bold { Font::Bold } else { Font::Regular };
        for c in span.text.chars() {
            if c.is_whitespace() {
                if !current.fragments.is_empty() {
                    words.push(mem::take(&mut current));
                }
                continue;
            }
            match current.fragments.last_mut() {
                Some(fragment) if fragment.font == font => fragment.text.push(c),
                _ => current.fragments.push(Fragment { font, text: c.to_string(), width: 0.0 }),
            }
        }
    }
    if !current.fragments.is_empty() {
        words.push(current);
    }

    for word in &mut words {
        for fragment in &mut word.fragments {
            fragment.width = fragment.font.width(&fragment.text, BODY_SIZE);
        }
        word.width = word.fragments.iter().map(|f| f.width).sum();
    }
    words
}

/// Greedy line filling. Words wider than the line are split at glyph boundaries first.
fn break_lines(words: Vec<Word>, width: f64, space: f64) -> Vec<Vec<Word>> {
    let mut lines = Vec::new();
    let mut line: Vec<Word> = Vec::new();
    let mut line_width = 0.0;

    for word in words.into_iter().flat_map(|word| split_wide(word, width)) {
        let needed = if line.is_empty() { word.width } else { line_width + space + word.width };
        if !line.is_empty() && needed > width {
            lines.push(mem::take(&mut line));
            line_width = word.width;
        } else {
            line_width = needed;
        }
        line.push(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Cuts a word into pieces no wider than `width`; a single glyph is never cut.
fn split_wide(word: Word, width: f64) -> Vec<Word> {
    if word.width <= width {
        return vec![word];
    }

    let mut pieces = Vec::new();
    let mut piece = Word::default();
    for fragment in word.fragments {
        for c in fragment.text.chars() {
            let glyph = fragment.font.width(c.encode_utf8(&mut [0; 4]), BODY_SIZE);
            if piece.width + glyph > width && !piece.fragments.is_empty() {
                pieces.push(mem::take(&mut piece));
            }
            match piece.fragments.last_mut() {
                Some(last) if last.font == fragment.font => {
                    last.text.push(c);
                    last.width += glyph;
                },
                _ => piece.fragments.push(Fragment { font: fragment.font, text: c.to_string(), width: glyph }),
            }
            piece.width += glyph;
        }
    }
    if !piece.fragments.is_empty() {
        pieces.push(piece);
    }
    pieces
}
