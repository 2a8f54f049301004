//! Bank slip (boleto bancário).

use lazy_static::lazy_static;
use regex::Regex;

use super::{DocumentModel, ModelDescriptor, PeriodPolicy};
use crate::models::record::ExtractionRecord;
use crate::rules::patterns::LINHA_DIGITAVEL;
use crate::rules::{clamp_score, first_capture, keyword_score};

lazy_static! {
    static ref DUE_DATE: Regex = Regex::new(r"[Vv]encimento[:\s]*(\d{2}/\d{2}/\d{4})").unwrap();
    static ref AMOUNT: Regex = Regex::new(
        r"(?i)valor\s*(?:do\s+)?(?:documento|boleto)?[:\s]*R?\$?\s*(\d[\d.,]*)"
    ).unwrap();
}

const KEYWORDS: [(&str, f32); 6] = [
    ("boleto", 0.30),
    ("linha digitável", 0.25),
    ("beneficiário", 0.15),
    ("sacado", 0.15),
    ("nosso número", 0.15),
    ("cedente", 0.15),
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Boleto Bancário",
    icon: "barcode",
    description: "Boleto de cobrança bancário",
    category: "Boleto",
    variant: "Padrão",
    period: PeriodPolicy::PerPage,
    requires_cleaning: false,
};

pub struct Boleto;

impl Boleto {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Boleto {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel for Boleto {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let mut score = keyword_score(&text.to_lowercase(), &KEYWORDS);
        if LINHA_DIGITAVEL.is_match(text) {
            score += 0.30;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::scalar("Boleto Bancário");
        record.set_opt("linha_digitavel", LINHA_DIGITAVEL.find(text).map(|m| m.as_str()));
        record.set_opt("vencimento", first_capture(&[&*DUE_DATE], text));
        record.set_opt("valor", first_capture(&[&*AMOUNT], text));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
Banco Exemplo S.A.  Recibo do Sacado
23790.12345 60000.123456 78901.234567 8 96540000125000
Beneficiário: CONDOMINIO JARDIM
Vencimento: 10/09/2024
Valor do Documento: R$ 1.250,00
Nosso Número 123456
";

    #[test]
    fn test_detect() {
        let model = Boleto::new();
        let score = model.detect(SAMPLE);
        assert!(score > 0.7, "score was {}", score);
        assert!(model.detect(SAMPLE) > model.detect("Beneficiário: CONDOMINIO JARDIM"));
    }

    #[test]
    fn test_extract() {
        let record = Boleto::new().extract(SAMPLE);
        assert_eq!(record.document_type(), Some("Boleto Bancário"));
        assert_eq!(
            record.get("linha_digitavel"),
            Some("23790.12345 60000.123456 78901.234567 8 96540000125000")
        );
        assert_eq!(record.get("vencimento"), Some("10/09/2024"));
        assert_eq!(record.get("valor"), Some("1.250,00"));
    }

    #[test]
    fn test_extract_missing_fields_are_absent() {
        let record = Boleto::new().extract("boleto sem dados");
        assert_eq!(record.fields().len(), 1);
    }
}
