//! "Recibo de pagamento de salário" keyed by a `Competência MM/YYYY` header.

use lazy_static::lazy_static;
use regex::Regex;

use super::{pipe_count, Verba, CATEGORY, ICON, PERIOD, PERIOD_FIELD};
use crate::catalog::{collapse_whitespace, text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::{clamp_score, keyword_score};

lazy_static! {
    static ref COMPETENCE: Regex = Regex::new(r"Competência\s+(\d{2}/\d{4})").unwrap();
    static ref ROW_WITH_QUANTITY: Regex =
        Regex::new(r"^(\d{3})\s+(.+?)\s+([\d.,]+)\s+([\d.,]+)$").unwrap();
    static ref ROW: Regex = Regex::new(r"^(\d{3})\s+(.+?)\s+([\d.,]+)$").unwrap();
    static ref CODED_ROW: Regex = Regex::new(r"(?m)^\s*\d{3}\s+\S.*\d,\d{2}\s*$").unwrap();
}

const KEYWORDS: [(&str, f32); 1] = [("recibo de pagamento de salário", 0.15)];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Contracheque — Competência",
    icon: ICON,
    description: "Recibo de pagamento de salário com cabeçalho Competência MM/YYYY",
    category: CATEGORY,
    variant: "Competência",
    period: PERIOD,
    requires_cleaning: false,
};

pub struct CompetencePayslip;

impl CompetencePayslip {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CompetencePayslip {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_row(line: &str) -> Option<Verba> {
    if let Some(caps) = ROW_WITH_QUANTITY.captures(line) {
        return Some(Verba {
            quantidade: Some(caps[3].to_string()),
            valor: Some(caps[4].to_string()),
            ..Verba::new(&caps[1], &caps[2])
        });
    }
    ROW.captures(line).map(|caps| Verba {
        valor: Some(caps[3].to_string()),
        ..Verba::new(&caps[1], &caps[2])
    })
}

impl DocumentModel for CompetencePayslip {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let mut score = keyword_score(&text.to_lowercase(), &KEYWORDS);
        if COMPETENCE.is_match(text) {
            score += 0.45;
        }
        if CODED_ROW.find_iter(text).count() > 2 {
            score += 0.15;
        }
        if pipe_count(text) > 5 {
            score -= 0.20;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::tabular("Contracheque", RowsLabel::Verbas);
        record.set_opt(
            PERIOD_FIELD,
            COMPETENCE.captures(text).map(|caps| caps[1].to_string()),
        );

        for line in text_lines(text) {
            if let Some(verba) = parse_row(&collapse_whitespace(line)) {
                record.push_row(verba.into_fields());
            }
        }

        record
    }
}
