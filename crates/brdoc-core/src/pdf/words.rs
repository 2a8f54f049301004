//! Positioned words from a page content stream.
//!
//! Walks the text operators of one page, tracking the text position well
//! enough to give each word a page-relative `top`/`left`. Glyph widths are not
//! read from the font; each character is assumed half an em wide, which is
//! enough for line grouping and left-to-right ordering.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::trace;

use super::Result;
use crate::error::PdfError;
use crate::layout::PositionedWord;

/// A4 height in points, used when the page has no MediaBox.
const DEFAULT_PAGE_HEIGHT: f32 = 842.0;

/// Estimated glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments below this (thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

/// Positioned words of a 1-based page.
pub fn page_words(doc: &Document, page: u32) -> Result<Vec<PositionedWord>> {
    let pages = doc.get_pages();
    let page_id = *pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
    let raw = doc
        .get_page_content(page_id)
        .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
    let content = Content::decode(&raw).map_err(|e| PdfError::TextExtraction(e.to_string()))?;

    let mut state = TextState::new(page_height(doc, page_id));
    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "BT" => state.begin(),
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    state.font = name.clone();
                }
                state.size = operands.get(1).and_then(number).unwrap_or(state.size);
            }
            "TL" => state.leading = operands.first().and_then(number).unwrap_or(0.0),
            "Td" => state.move_line(arg(operands, 0), arg(operands, 1)),
            "TD" => {
                state.leading = -arg(operands, 1);
                state.move_line(arg(operands, 0), arg(operands, 1));
            }
            "Tm" if operands.len() >= 6 => {
                state.scale = arg(operands, 3).abs().max(f32::EPSILON);
                state.set_line(arg(operands, 4), arg(operands, 5));
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = decode(doc, &fonts, &state.font, bytes);
                    state.show(&text);
                }
            }
            "'" | "\"" => {
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.last() {
                    let text = decode(doc, &fonts, &state.font, bytes);
                    state.show(&text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let mut combined = String::new();
                    for item in items {
                        match item {
                            Object::String(bytes, _) => {
                                combined.push_str(&decode(doc, &fonts, &state.font, bytes))
                            }
                            other => {
                                if number(other).is_some_and(|n| n < TJ_SPACE_THRESHOLD) {
                                    combined.push(' ');
                                }
                            }
                        }
                    }
                    state.show(&combined);
                }
            }
            _ => {}
        }
    }

    trace!("Page {}: {} positioned words", page, state.words.len());
    Ok(state.words)
}

struct TextState {
    page_height: f32,
    font: Vec<u8>,
    size: f32,
    scale: f32,
    leading: f32,
    line_x: f32,
    line_y: f32,
    x: f32,
    words: Vec<PositionedWord>,
}

impl TextState {
    fn new(page_height: f32) -> Self {
        Self {
            page_height,
            font: Vec::new(),
            size: 12.0,
            scale: 1.0,
            leading: 0.0,
            line_x: 0.0,
            line_y: 0.0,
            x: 0.0,
            words: Vec::new(),
        }
    }

    fn begin(&mut self) {
        self.scale = 1.0;
        self.set_line(0.0, 0.0);
    }

    fn set_line(&mut self, x: f32, y: f32) {
        self.line_x = x;
        self.line_y = y;
        self.x = x;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.set_line(self.line_x + tx * self.scale, self.line_y + ty * self.scale);
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn glyph_width(&self) -> f32 {
        self.size * self.scale * GLYPH_WIDTH
    }

    fn show(&mut self, text: &str) {
        let width = self.glyph_width();
        let top = self.page_height - self.line_y;

        let mut start: Option<(usize, String)> = None;
        let mut count = 0;
        for ch in text.chars() {
            if ch.is_whitespace() {
                if let Some((offset, word)) = start.take() {
                    self.push(word, top, offset, width);
                }
            } else {
                start.get_or_insert_with(|| (count, String::new())).1.push(ch);
            }
            count += 1;
        }
        if let Some((offset, word)) = start.take() {
            self.push(word, top, offset, width);
        }

        self.x += count as f32 * width;
    }

    fn push(&mut self, text: String, top: f32, offset: usize, width: f32) {
        let left = self.x + offset as f32 * width;
        self.words.push(PositionedWord::new(text, top, left));
    }
}

fn decode(doc: &Document, fonts: &BTreeMap<Vec<u8>, &Dictionary>, font: &[u8], bytes: &[u8]) -> String {
    fonts
        .get(font)
        .and_then(|f| f.get_font_encoding(doc).ok())
        .and_then(|enc| Document::decode_text(&enc, bytes).ok())
        .unwrap_or_else(|| decode_text_simple(bytes))
}

fn page_height(doc: &Document, page_id: ObjectId) -> f32 {
    let mut node = Some(page_id);
    while let Some(id) = node {
        let Ok(dict) = doc.get_dictionary(id) else {
            break;
        };
        if let Ok(Object::Array(bounds)) = dict.get(b"MediaBox") {
            if let (Some(low), Some(high)) = (
                bounds.get(1).and_then(number),
                bounds.get(3).and_then(number),
            ) {
                return high - low;
            }
        }
        node = match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => Some(*parent),
            _ => None,
        };
    }
    DEFAULT_PAGE_HEIGHT
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn arg(operands: &[Object], index: usize) -> f32 {
    operands.get(index).and_then(number).unwrap_or(0.0)
}

/// Decoding for strings whose font carries no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_show_splits_words_with_offsets() {
        let mut state = TextState::new(842.0);
        state.size = 10.0;
        state.set_line(100.0, 742.0);
        state.show("Salário  Base");

        assert_eq!(
            state.words,
            vec![
                PositionedWord::new("Salário", 100.0, 100.0),
                PositionedWord::new("Base", 100.0, 145.0),
            ]
        );
        assert_eq!(state.x, 165.0);
    }

    #[test]
    fn test_leading_moves_down() {
        let mut state = TextState::new(842.0);
        state.set_line(50.0, 700.0);
        state.leading = 14.0;
        state.next_line();
        state.show("linha");
        assert_eq!(state.words[0].top, 156.0);
        assert_eq!(state.words[0].left, 50.0);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"abc"), "abc");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41]), "A");
        assert_eq!(decode_text_simple(&[0x53, 0xE3, 0x6F]), "São");
    }
}
