//! Payslip whose header block carries an "Unidade Organizacional" line and
//! whose period is the last token of the line that follows it.

use lazy_static::lazy_static;
use regex::Regex;

use super::{Verba, CATEGORY, ICON, PERIOD, PERIOD_FIELD};
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::dates::month_year_key;
use crate::rules::patterns::SIGNED_MONEY;
use crate::rules::{clamp_score, keyword_score};

lazy_static! {
    static ref ROW: Regex =
        Regex::new(r"^(\S+)\s+(.*?)\s+((?:-?\d{1,3}(?:\.\d{3})*,\d{2}-?\s*)+)$").unwrap();
}

const KEYWORDS: [(&str, f32); 5] = [
    ("unidade organizacional", 0.45),
    ("bases", 0.10),
    ("totais", 0.10),
    ("proventos", 0.10),
    ("descontos", 0.05),
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Contracheque — Unidade Organizacional",
    icon: ICON,
    description: "Holerite com bloco de unidade organizacional e valores com sinal",
    category: CATEGORY,
    variant: "Unidade organizacional",
    period: PERIOD,
    requires_cleaning: false,
};

pub struct OrgUnitPayslip;

impl OrgUnitPayslip {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OrgUnitPayslip {
    fn default() -> Self {
        Self::new()
    }
}

fn period(lines: &[&str]) -> Option<String> {
    let header = lines
        .iter()
        .position(|l| l.starts_with("Unidade Organizacional"))?;
    let tokens: Vec<&str> = lines.get(header + 1)?.split_whitespace().collect();
    let last = *tokens.last()?;

    let normalized = match last.split_once(|c: char| c == '/' || c == '-') {
        Some((month, year)) => month_year_key(month, year),
        // `Março 2024`
        None if tokens.len() >= 2 => month_year_key(tokens[tokens.len() - 2], last),
        None => None,
    };
    Some(normalized.unwrap_or_else(|| last.to_string()))
}

fn parse_row(line: &str) -> Option<Verba> {
    let caps = ROW.captures(line)?;
    let numbers: Vec<&str> = SIGNED_MONEY.find_iter(&caps[3]).map(|m| m.as_str()).collect();
    let valor = numbers.last()?.to_string();
    let quantidade = if numbers.len() >= 2 {
        Some(numbers[0].to_string())
    } else {
        None
    };

    Some(Verba {
        quantidade,
        valor: Some(valor),
        ..Verba::new(&caps[1], caps[2].trim())
    })
}

fn is_stop(line: &str) -> bool {
    line == "BASES" || line.starts_with("TOTAIS")
}

impl DocumentModel for OrgUnitPayslip {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let mut score = keyword_score(&text.to_lowercase(), &KEYWORDS);
        if text_lines(text).iter().any(|l| ROW.is_match(l)) {
            score += 0.15;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let lines = text_lines(text);
        let mut record = ExtractionRecord::tabular("Contracheque", RowsLabel::Verbas);
        record.set_opt(PERIOD_FIELD, period(&lines));

        for line in lines.iter().take_while(|l| !is_stop(l)) {
            if let Some(verba) = parse_row(line) {
                record.push_row(verba.into_fields());
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
Unidade Organizacional Período
LOJA CENTRO 03/2024
PROVENTOS DESCONTOS
0100 Salário Mensal 220,00 3.300,00
0200 Hora Extra 100% 4,00 120,00
0510 INSS 297,00-
BASES
9999 Base FGTS 3.420,00
";

    #[test]
    fn test_period_follows_header() {
        let lines = text_lines(SAMPLE);
        assert_eq!(period(&lines).as_deref(), Some("03/2024"));
        assert_eq!(period(&["sem cabeçalho"]), None);
    }

    #[test]
    fn test_period_is_normalized() {
        let period_of = |line: &str| period(&["Unidade Organizacional", line]);
        assert_eq!(period_of("LOJA CENTRO 3/2024").as_deref(), Some("03/2024"));
        assert_eq!(period_of("LOJA CENTRO MAR/2024").as_deref(), Some("03/2024"));
        assert_eq!(period_of("LOJA CENTRO Março 2024").as_deref(), Some("03/2024"));
        assert_eq!(period_of("LOJA CENTRO 07-2024").as_deref(), Some("07/2024"));
        assert_eq!(period_of("LOJA CENTRO").as_deref(), Some("CENTRO"));
    }

    #[test]
    fn test_detect() {
        let model = OrgUnitPayslip::new();
        assert!(model.detect(SAMPLE) > 0.7);
        assert_eq!(model.detect("nenhum sinal"), 0.0);
    }

    #[test]
    fn test_extract_stops_at_bases() {
        let record = OrgUnitPayslip::new().extract(SAMPLE);
        assert_eq!(record.get("mes_ano"), Some("03/2024"));

        let rows = record.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["codigo"], "0100");
        assert_eq!(rows[0]["descricao"], "Salário Mensal");
        assert_eq!(rows[0]["quantidade"], "220,00");
        assert_eq!(rows[0]["valor"], "3.300,00");
        assert_eq!(rows[2]["valor"], "297,00-");
        assert!(!rows[2].contains_key("quantidade"));
    }
}
