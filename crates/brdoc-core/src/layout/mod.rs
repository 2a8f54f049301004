//! Line reconstruction from positioned words.
//!
//! PDF and OCR collaborators hand us individual word tokens with page-relative
//! coordinates. Downstream extraction works on lines, so words sharing a row are
//! grouped by vertical proximity and joined left to right.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Default vertical tolerance, in page units.
pub const DEFAULT_LINE_TOLERANCE: f32 = 3.0;

/// A single word token with its page-relative position.
///
/// `top` grows downward from the top edge of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedWord {
    /// Token text.
    pub text: String,
    /// Distance from the top edge of the page.
    pub top: f32,
    /// Distance from the left edge of the page.
    pub left: f32,
}

impl PositionedWord {
    pub fn new(text: impl Into<String>, top: f32, left: f32) -> Self {
        Self {
            text: text.into(),
            top,
            left,
        }
    }
}

/// Groups words into lines using a vertical-tolerance pass.
#[derive(Debug, Clone, Copy)]
pub struct LineReconstructor {
    tolerance: f32,
}

impl LineReconstructor {
    /// Create a reconstructor with the default tolerance.
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_LINE_TOLERANCE,
        }
    }

    /// Set the vertical tolerance.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Rebuild the ordered lines of one page.
    ///
    /// The reference `top` of a line is the first word that opened it; it is not
    /// moved as further words join, so a slow drift across a row cannot chain two
    /// visual lines together.
    pub fn reconstruct(&self, words: &[PositionedWord]) -> Vec<String> {
        let mut sorted: Vec<&PositionedWord> = words.iter().collect();
        sorted.sort_by(|a, b| compare_position(a, b));

        let mut lines = Vec::new();
        let mut current: Vec<&PositionedWord> = Vec::new();
        let mut reference_top: Option<f32> = None;

        for word in sorted {
            match reference_top {
                Some(top) if (word.top - top).abs() <= self.tolerance => current.push(word),
                _ => {
                    if !current.is_empty() {
                        lines.push(join_row(&mut current));
                    }
                    current.push(word);
                    reference_top = Some(word.top);
                }
            }
        }

        if !current.is_empty() {
            lines.push(join_row(&mut current));
        }

        trace!("Reconstructed {} lines from {} words", lines.len(), words.len());
        lines
    }

    /// Rebuild the page and join its lines with newlines.
    pub fn reconstruct_text(&self, words: &[PositionedWord]) -> String {
        self.reconstruct(words).join("\n")
    }
}

impl Default for LineReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

/// Group words into lines with the given vertical tolerance.
pub fn reconstruct_lines(words: &[PositionedWord], tolerance: f32) -> Vec<String> {
    LineReconstructor::new()
        .with_tolerance(tolerance)
        .reconstruct(words)
}

/// Join one row left to right and clear it.
fn join_row(row: &mut Vec<&PositionedWord>) -> String {
    row.sort_by(|a, b| a.left.total_cmp(&b.left));
    let line = row
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    row.clear();
    line
}

fn compare_position(a: &PositionedWord, b: &PositionedWord) -> Ordering {
    a.top
        .total_cmp(&b.top)
        .then_with(|| a.left.total_cmp(&b.left))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(text: &str, top: f32, left: f32) -> PositionedWord {
        PositionedWord::new(text, top, left)
    }

    #[test]
    fn test_empty_input() {
        assert!(reconstruct_lines(&[], 3.0).is_empty());
    }

    #[test]
    fn test_groups_and_orders_words() {
        let words = vec![
            word("2.120,00", 100.4, 400.0),
            word("Salário", 100.0, 60.0),
            word("0010", 101.0, 20.0),
            word("Base", 99.5, 110.0),
            word("Total", 140.0, 20.0),
        ];

        let lines = reconstruct_lines(&words, 3.0);
        assert_eq!(lines, vec!["0010 Salário Base 2.120,00", "Total"]);
    }

    #[test]
    fn test_reference_top_is_not_advanced() {
        // Each word is within tolerance of its predecessor but the third drifts past
        // the anchor of the first.
        let words = vec![
            word("a", 10.0, 0.0),
            word("b", 12.5, 10.0),
            word("c", 14.0, 20.0),
        ];

        let lines = reconstruct_lines(&words, 3.0);
        assert_eq!(lines, vec!["a b", "c"]);
    }

    #[test]
    fn test_stray_mark_gets_own_line() {
        let words = vec![
            word("header", 10.0, 0.0),
            word(".", 40.0, 300.0),
            word("footer", 80.0, 0.0),
        ];

        assert_eq!(reconstruct_lines(&words, 3.0).len(), 3);
    }

    #[test]
    fn test_deterministic_output() {
        let words = vec![
            word("x", 5.0, 5.0),
            word("y", 5.0, 1.0),
            word("z", 20.0, 0.0),
            word("w", 6.0, 3.0),
        ];

        let reconstructor = LineReconstructor::new();
        let first = reconstructor.reconstruct_text(&words);
        let second = reconstructor.reconstruct_text(&words);
        assert_eq!(first, second);
        assert_eq!(first, "y w x\nz");
    }
}
