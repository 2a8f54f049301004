//! Pipe-delimited payslip (Belshop layout).
//!
//! The OCR for this layout mirrors the watermark glyphs, so reversed fragments
//! such as `obicer` ("recibo") appear glued to cells. They are stripped before
//! the row is split on `|`.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::{pipe_count, Verba, CATEGORY, ICON, PERIOD, PERIOD_FIELD};
use crate::catalog::region::TableRegion;
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::dates::month_year_key;
use crate::rules::patterns::{LOOSE_NUMBER, MONTH_ABBREV_YEAR};
use crate::rules::{clamp_score, keyword_score};

lazy_static! {
    static ref MENSALISTA: Regex = Regex::new(r"Mensalista\s+(\w+)\s+de\s+(\d{4})").unwrap();
    static ref FIRST_CELL: Regex = Regex::new(r"^(\d+)\s+(.+)$").unwrap();
}

/// Mirrored OCR fragments, matched lower-cased by containment.
pub const REVERSED_TOKENS: [&str; 9] = [
    "obicer",
    "etsen",
    "adanimircsid",
    "adiuqíl",
    "aicnâtropmi",
    "odibecer",
    "oralced",
    "oiránoicnuf",
    "arutanissa",
];

const KEYWORDS: [(&str, f32); 5] = [
    ("contracheque", 0.20),
    ("holerite", 0.20),
    ("total de vencimentos", 0.15),
    ("base/outros", 0.20),
    ("mensalista", 0.15),
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Contracheque — Belshop",
    icon: ICON,
    description: "Holerite com colunas separadas por barras verticais",
    category: CATEGORY,
    variant: "Belshop (pipe)",
    period: PERIOD,
    requires_cleaning: false,
};

pub struct PipePayslip;

impl PipePayslip {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PipePayslip {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop every whitespace token containing a reversed fragment.
pub fn strip_reversed_tokens(line: &str) -> String {
    line.split_whitespace()
        .filter(|token| {
            let lowered = token.to_lowercase();
            !REVERSED_TOKENS.iter().any(|r| lowered.contains(r))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn period(text: &str) -> Option<String> {
    if let Some(caps) = MENSALISTA.captures(text) {
        if let Some(key) = month_year_key(&caps[1], &caps[2]) {
            return Some(key);
        }
    }
    MONTH_ABBREV_YEAR
        .captures(text)
        .and_then(|caps| month_year_key(&caps[1], &caps[2]))
}

fn amount_cell(cells: &[&str], index: usize) -> Option<String> {
    cells
        .get(index)
        .filter(|c| !c.is_empty() && LOOSE_NUMBER.is_match(c))
        .map(|c| c.to_string())
}

fn parse_row(line: &str) -> Option<Verba> {
    let cleaned = strip_reversed_tokens(line);
    let mut cells: Vec<&str> = cleaned.split('|').map(str::trim).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }

    let caps = FIRST_CELL.captures(cells.first()?)?;
    Some(Verba {
        referencia: amount_cell(&cells, 1),
        vencimento: amount_cell(&cells, 2),
        desconto: amount_cell(&cells, 3),
        ..Verba::new(&caps[1], caps[2].trim())
    })
}

impl DocumentModel for PipePayslip {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let pipes = pipe_count(text);
        let mut score = keyword_score(&text.to_lowercase(), &KEYWORDS);
        if pipes > 5 {
            score += 0.30;
        }
        if pipes < 3 {
            score -= 0.40;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let lines = text_lines(text);
        let mut record = ExtractionRecord::tabular("Contracheque (Belshop)", RowsLabel::Verbas);
        record.set_opt(PERIOD_FIELD, period(text));

        let rows = TableRegion::rows(
            &lines,
            |l| l.contains("Código") && l.contains("Descrição") && l.contains("Vencimentos"),
            |l| l.contains("Total de Vencimentos") || l.contains("BASE/OUTROS"),
        );

        for line in rows.into_iter().filter(|l| l.contains('|')) {
            match parse_row(line) {
                Some(verba) => record.push_row(verba.into_fields()),
                None => debug!("Skipping pipe row: {}", line),
            }
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
BELSHOP COMERCIO LTDA  Contracheque
Mensalista Março de 2024
| Código Descrição | Referência | Vencimentos | Descontos |
| 001 SALARIO MENSAL obicer | 30,00 | 2.500,00 | |
| 310 INSS | 9,00 | | 225,00 |
| 999 SEM VALORES | | | |
| Total de Vencimentos | | 2.500,00 | 225,00 |
| BASE/OUTROS | 2.500,00 | | |
";

    #[test]
    fn test_strip_reversed_tokens() {
        assert_eq!(strip_reversed_tokens("SALARIO OBICER | 30,00"), "SALARIO | 30,00");
        assert_eq!(strip_reversed_tokens("etsenoidibecer x"), "x");
    }

    #[test]
    fn test_detect_prefers_pipes() {
        let model = PipePayslip::new();
        let score = model.detect(SAMPLE);
        assert!(score > 0.8, "score was {}", score);
        assert_eq!(model.detect("contracheque mensalista sem barras"), 0.0);
    }

    #[test]
    fn test_extract() {
        let record = PipePayslip::new().extract(SAMPLE);
        assert_eq!(record.get("mes_ano"), Some("03/2024"));

        let rows = record.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["codigo"], "001");
        assert_eq!(rows[0]["descricao"], "SALARIO MENSAL");
        assert_eq!(rows[0]["referencia"], "30,00");
        assert_eq!(rows[0]["vencimento"], "2.500,00");
        assert!(!rows[0].contains_key("desconto"));
        assert_eq!(rows[1]["desconto"], "225,00");
    }

    #[test]
    fn test_coded_row_without_values_is_kept() {
        let model = PipePayslip::new();
        let record = model.extract(SAMPLE);
        assert_eq!(record.rows()[2]["codigo"], "999");
        assert_eq!(record.rows()[2]["descricao"], "SEM VALORES");

        let table = model.to_table(&record);
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(2, "vencimento"), Some(""));
        assert_eq!(table.cell(2, "desconto"), Some(""));
    }

    #[test]
    fn test_period_from_abbreviation() {
        assert_eq!(period("Competência ABR/2023").as_deref(), Some("04/2023"));
        assert_eq!(period("sem período"), None);
    }
}
