//! "Demonstrativo de MM/YYYY" payslip with four-digit codes.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::{parse_coded_line, pipe_count, CodedLine, Verba, CATEGORY, ICON, PERIOD, PERIOD_FIELD};
use crate::catalog::region::TableRegion;
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::patterns::MONTH_YEAR;
use crate::rules::{clamp_score, keyword_score};

lazy_static! {
    static ref CODE: Regex = Regex::new(r"^\d{4}$").unwrap();
    static ref TITLE: Regex = Regex::new(r"(?i)DEMONSTRATIVO\s+DE\s+(\d{2})/(\d{4})").unwrap();
    static ref CODED_MONEY_ROW: Regex = Regex::new(r"(?m)^\d{4}\s.*\d,\d{2}").unwrap();
}

const KEYWORDS: [(&str, f32); 4] = [
    ("totais", 0.10),
    ("cod.", 0.10),
    ("vencimentos", 0.05),
    ("descontos", 0.05),
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Contracheque — Demonstrativo",
    icon: ICON,
    description: "Demonstrativo mensal com códigos de quatro dígitos e coluna de quantidade",
    category: CATEGORY,
    variant: "Demonstrativo (4 dígitos)",
    period: PERIOD,
    requires_cleaning: false,
};

pub struct FourDigitPayslip;

impl FourDigitPayslip {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FourDigitPayslip {
    fn default() -> Self {
        Self::new()
    }
}

fn period(lines: &[&str]) -> Option<String> {
    for line in lines {
        if let Some(caps) = TITLE.captures(line) {
            return Some(format!("{}/{}", &caps[1], &caps[2]));
        }
    }
    lines
        .iter()
        .filter(|l| l.contains("Mês / Ano") || l.to_uppercase().contains("DEMONSTRATIVO"))
        .find_map(|l| MONTH_YEAR.captures(l))
        .map(|caps| format!("{}/{}", &caps[1], &caps[2]))
}

/// One value is the amount, two are quantity and amount, three are quantity,
/// earning and deduction.
fn classify(line: CodedLine) -> Verba {
    let verba = Verba::new(line.code, line.description);
    let mut values = line.values.into_iter();
    match (values.next(), values.next(), values.next()) {
        (Some(amount), None, None) => verba.with_classified_amount(amount),
        (Some(quantity), Some(amount), None) => Verba {
            quantidade: Some(quantity),
            ..verba
        }
        .with_classified_amount(amount),
        (Some(quantity), Some(earning), Some(deduction)) => Verba {
            quantidade: Some(quantity),
            vencimento: Some(earning),
            desconto: Some(deduction),
            ..verba
        },
        _ => verba,
    }
}

impl DocumentModel for FourDigitPayslip {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let mut score = keyword_score(&text.to_lowercase(), &KEYWORDS);
        if TITLE.is_match(text) {
            score += 0.45;
        }
        if CODED_MONEY_ROW.find_iter(text).count() > 3 {
            score += 0.20;
        }
        if pipe_count(text) > 5 {
            score -= 0.20;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let lines = text_lines(text);
        let mut record = ExtractionRecord::tabular("Contracheque", RowsLabel::Verbas);
        record.set_opt(PERIOD_FIELD, period(&lines));

        let rows = TableRegion::rows(
            &lines,
            |l| {
                (l.contains("COD.") || l.contains("Descrição"))
                    && (l.contains("VENCIMENTOS") || l.contains("DESCONTOS"))
            },
            |l| l.contains("TOTAIS"),
        );

        for line in rows {
            match parse_coded_line(line, &CODE) {
                Some(coded) => record.push_row(classify(coded).into_fields()),
                None => debug!("Skipping demonstrativo line: {}", line),
            }
        }

        record
    }
}
