//! Bank statement (extrato bancário): one `lancamentos` row per dated entry.

use lazy_static::lazy_static;
use regex::Regex;

use super::{text_lines, DocumentModel, ModelDescriptor, PeriodPolicy};
use crate::models::record::{ExtractionRecord, Fields, RowsLabel};
use crate::rules::{clamp_score, keyword_score};

lazy_static! {
    static ref ENTRY: Regex =
        Regex::new(r"^(\d{2}/\d{2}(?:/\d{2,4})?)\s+(.+?)\s+([\d.,]+[DC]?)\s*$").unwrap();
}

const KEYWORDS: [(&str, f32); 6] = [
    ("extrato", 0.25),
    ("saldo anterior", 0.25),
    ("saldo final", 0.20),
    ("conta corrente", 0.15),
    ("lançamentos", 0.10),
    ("movimentação", 0.10),
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Extrato Bancário",
    icon: "university",
    description: "Extrato de conta bancária",
    category: "Extrato",
    variant: "Padrão",
    period: PeriodPolicy::PerPage,
    requires_cleaning: false,
};

pub struct Extrato;

impl Extrato {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Extrato {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_entry(line: &str) -> Option<Fields> {
    let caps = ENTRY.captures(line)?;
    let mut fields = Fields::new();
    fields.insert("data".to_string(), caps[1].to_string());
    fields.insert("descricao".to_string(), caps[2].trim().to_string());
    fields.insert("valor".to_string(), caps[3].to_string());
    Some(fields)
}

impl DocumentModel for Extrato {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        clamp_score(keyword_score(&text.to_lowercase(), &KEYWORDS))
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::tabular("Extrato Bancário", RowsLabel::Lancamentos);
        for row in text_lines(text).into_iter().filter_map(parse_entry) {
            record.push_row(row);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
EXTRATO DE CONTA CORRENTE
Período 01/03/2024 a 31/03/2024
01/03 SALDO ANTERIOR 1.520,00
04/03/2024 PIX RECEBIDO JOAO 300,00C
05/03/24 TARIFA PACOTE 29,90D
sem data 10,00
SALDO FINAL 1.790,10
";

    #[test]
    fn test_detect() {
        let model = Extrato::new();
        assert!(model.detect(SAMPLE) > 0.8);
        assert_eq!(model.detect("recibo"), 0.0);
    }

    #[test]
    fn test_extract_rows() {
        let record = Extrato::new().extract(SAMPLE);
        assert_eq!(record.rows_label(), Some(RowsLabel::Lancamentos));

        let rows = record.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["data"], "01/03");
        assert_eq!(rows[0]["descricao"], "SALDO ANTERIOR");
        assert_eq!(rows[1]["data"], "04/03/2024");
        assert_eq!(rows[1]["valor"], "300,00C");
        assert_eq!(rows[2]["descricao"], "TARIFA PACOTE");
        assert_eq!(rows[2]["valor"], "29,90D");
    }

    #[test]
    fn test_table_columns() {
        let table = Extrato::new().to_table(&Extrato::new().extract(SAMPLE));
        assert_eq!(table.columns, vec!["data", "descricao", "valor"]);
        assert_eq!(table.len(), 3);
    }
}
