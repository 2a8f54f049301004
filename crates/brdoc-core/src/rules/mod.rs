//! Rule-based field extractors for Brazilian documents.

pub mod dates;
pub mod money;
pub mod patterns;
pub mod punches;

pub use dates::{month_number, reconstruct_year, DateExtractor, PeriodRange};
pub use money::{
    find_money_tokens, format_br_amount, is_money_token, parse_br_amount, parse_br_amount_opt,
    MoneyExtractor, MoneyValue,
};
pub use punches::{minutes_since_midnight, normalize_time, PunchFilter};

use regex::Regex;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Run an ordered list of patterns and return the first capture group of the
/// first pattern that matches.
pub fn first_capture(strategies: &[&Regex], text: &str) -> Option<String> {
    strategies.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Like [`first_capture`], returning every capture group of the winning match.
pub fn first_captures(strategies: &[&Regex], text: &str) -> Option<Vec<String>> {
    strategies.iter().find_map(|pattern| {
        pattern.captures(text).map(|caps| {
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().trim().to_string()).unwrap_or_default())
                .collect()
        })
    })
}

/// Sum of the weights whose keyword occurs in the lower-cased text.
pub fn keyword_score(lowered: &str, weights: &[(&str, f32)]) -> f32 {
    weights
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, weight)| weight)
        .sum()
}

/// Clamp a detection score to `[0, 1]`.
pub fn clamp_score(score: f32) -> f32 {
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_capture_respects_order() {
        let specific = Regex::new(r"Período De (\S+)").unwrap();
        let generic = Regex::new(r"(\d{2}/\d{2}/\d{4})").unwrap();
        let text = "Emitido 05/04/2024 Período De 01/03/2024";

        assert_eq!(
            first_capture(&[&specific, &generic], text).as_deref(),
            Some("01/03/2024")
        );
        assert_eq!(
            first_capture(&[&generic, &specific], text).as_deref(),
            Some("05/04/2024")
        );
        assert_eq!(first_capture(&[], text), None);
    }

    #[test]
    fn test_first_captures_all_groups() {
        let pattern = Regex::new(r"(\d{2}/\d{2}/\d{4}) a (\d{2}/\d{2}/\d{4})").unwrap();
        let groups = first_captures(&[&pattern], "Período: 01/03/2024 a 31/03/2024").unwrap();
        assert_eq!(groups, vec!["01/03/2024", "31/03/2024"]);
    }

    #[test]
    fn test_keyword_score() {
        let weights = [("holerite", 0.30), ("inss", 0.08)];
        assert!((keyword_score("holerite inss", &weights) - 0.38).abs() < 1e-6);
        assert_eq!(keyword_score("nada", &weights), 0.0);
        assert_eq!(clamp_score(1.4), 1.0);
        assert_eq!(clamp_score(-0.2), 0.0);
    }
}
