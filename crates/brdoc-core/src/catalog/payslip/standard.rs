//! Space-delimited payslip with an `MM/YYYY` period.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::{
    first_month_year, parse_coded_line, pipe_count, reference_then_amount, CATEGORY, ICON, PERIOD,
    PERIOD_FIELD,
};
use crate::catalog::region::TableRegion;
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::patterns::{CNPJ, MONEY_ANYWHERE, MONTH_YEAR_BOUNDED};
use crate::rules::{clamp_score, keyword_score};

lazy_static! {
    static ref CODE: Regex = Regex::new(r"^\d{3,4}$").unwrap();
}

const KEYWORDS: [(&str, f32); 9] = [
    ("demonstrativo de pagamento", 0.35),
    ("contracheque", 0.35),
    ("holerite", 0.30),
    ("salário base", 0.15),
    ("total de vencimentos", 0.15),
    ("fgts", 0.08),
    ("inss", 0.08),
    ("vencimentos", 0.08),
    ("descontos", 0.08),
];

const TERMINALS: [&str; 3] = ["TOTAL DE VENCIMENTOS", "TOTAIS", "BASE CÁLC"];
const TOTALS_LINE: &str = "TOTAL DE VENCIMENTOS";

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Contracheque — Padrão",
    icon: ICON,
    description: "Holerite com colunas separadas por espaço, data em MM/YYYY",
    category: CATEGORY,
    variant: "Padrão (espaço)",
    period: PERIOD,
    requires_cleaning: false,
};

/// Payslip whose columns are separated by runs of spaces.
pub struct StandardPayslip;

impl StandardPayslip {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StandardPayslip {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel for StandardPayslip {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let mut score = keyword_score(&text.to_lowercase(), &KEYWORDS);
        if MONTH_YEAR_BOUNDED.is_match(text) {
            score += 0.05;
        }
        if pipe_count(text) > 5 {
            score -= 0.20;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let lines = text_lines(text);
        let mut record = ExtractionRecord::tabular("Contracheque", RowsLabel::Verbas);

        record.set_opt(PERIOD_FIELD, lines.iter().find_map(|l| first_month_year(l)));

        if let Some(totals) = lines.iter().find(|l| l.contains(TOTALS_LINE)) {
            let values: Vec<&str> = MONEY_ANYWHERE.find_iter(totals).map(|m| m.as_str()).collect();
            record.set_opt("total_vencimentos", values.first().copied());
            record.set_opt("total_descontos", values.get(1).copied());
        }

        let rows = TableRegion::rows(
            &lines,
            |l| {
                let upper = l.to_uppercase();
                upper.contains("CÓD") && upper.contains("DESCRIÇÃO")
            },
            |l| TERMINALS.iter().any(|t| l.contains(t)),
        );

        for line in rows {
            match parse_coded_line(line, &CODE) {
                Some(coded) => record.push_row(reference_then_amount(coded).into_fields()),
                None => debug!("Skipping payslip line: {}", line),
            }
        }

        record.set_opt("cnpj", CNPJ.find(text).map(|m| m.as_str()));
        record
    }
}
