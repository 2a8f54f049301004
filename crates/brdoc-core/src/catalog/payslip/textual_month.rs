//! Payslip with the period printed as `JAN/2024`.
//!
//! This layout has no reliable header line, so every coded line carrying
//! money tokens is a row.

use lazy_static::lazy_static;
use regex::Regex;

use super::{parse_coded_line, pipe_count, reference_then_amount, CATEGORY, ICON, PERIOD, PERIOD_FIELD};
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::dates::month_year_key;
use crate::rules::patterns::{MONTH_ABBREV_YEAR, MONTH_ABBREV_YEAR_BOUNDED};
use crate::rules::{clamp_score, keyword_score};

lazy_static! {
    static ref CODE: Regex = Regex::new(r"^\d{3,4}$").unwrap();
}

const KEYWORDS: [(&str, f32); 4] = [
    ("contracheque", 0.20),
    ("holerite", 0.20),
    ("salário base", 0.10),
    ("total de vencimentos", 0.10),
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Contracheque — JAN/YYYY",
    icon: ICON,
    description: "Holerite com competência no formato JAN/2024",
    category: CATEGORY,
    variant: "JAN/YYYY (textual)",
    period: PERIOD,
    requires_cleaning: false,
};

pub struct TextualMonthPayslip;

impl TextualMonthPayslip {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextualMonthPayslip {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel for TextualMonthPayslip {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let mut score = keyword_score(&text.to_lowercase(), &KEYWORDS);
        if MONTH_ABBREV_YEAR_BOUNDED.is_match(text) {
            score += 0.35;
        }
        if pipe_count(text) > 5 {
            score -= 0.20;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::tabular("Contracheque (JAN/YYYY)", RowsLabel::Verbas);
        record.set_opt(
            PERIOD_FIELD,
            MONTH_ABBREV_YEAR
                .captures(text)
                .and_then(|caps| month_year_key(&caps[1], &caps[2])),
        );

        for line in text_lines(text) {
            if let Some(coded) = parse_coded_line(line, &CODE) {
                record.push_row(reference_then_amount(coded).into_fields());
            }
        }

        record
    }
}
