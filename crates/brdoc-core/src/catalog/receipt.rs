//! Payment receipt (recibo).

use super::{DocumentModel, ModelDescriptor, PeriodPolicy};
use crate::models::record::ExtractionRecord;
use crate::rules::patterns::{CPF, DATE_SLASHED, REAIS_AMOUNT};
use crate::rules::{clamp_score, first_capture, keyword_score};

const KEYWORDS: [(&str, f32); 5] = [
    ("recibo", 0.35),
    ("recebi de", 0.25),
    ("importância de", 0.20),
    ("quitação", 0.15),
    ("para devida comprovação", 0.20),
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Recibo de Pagamento",
    icon: "receipt",
    description: "Recibo de Pagamento / Confirmação",
    category: "Recibo",
    variant: "Padrão",
    period: PeriodPolicy::PerPage,
    requires_cleaning: false,
};

pub struct Recibo;

impl Recibo {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Recibo {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel for Recibo {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        clamp_score(keyword_score(&text.to_lowercase(), &KEYWORDS))
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::scalar("Recibo de Pagamento");
        record.set_opt("valor", first_capture(&[&*REAIS_AMOUNT], text));
        record.set_opt("data", first_capture(&[&*DATE_SLASHED], text));
        record.set_opt("cpf", CPF.find(text).map(|m| m.as_str()));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
RECIBO
Recebi de JOSE ALVES, CPF 321.654.987-00, a importância de R$ 300,00
referente ao aluguel, dando plena quitação.
São Paulo, 05/02/2024
";

    #[test]
    fn test_detect() {
        let model = Recibo::new();
        assert!(model.detect(SAMPLE) > 0.8);
        assert_eq!(model.detect("extrato"), 0.0);
    }

    #[test]
    fn test_extract() {
        let record = Recibo::new().extract(SAMPLE);
        assert_eq!(record.get("valor"), Some("300,00"));
        assert_eq!(record.get("data"), Some("05/02/2024"));
        assert_eq!(record.get("cpf"), Some("321.654.987-00"));
    }
}
