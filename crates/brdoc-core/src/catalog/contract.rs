//! Contracts, agreements and terms.

use lazy_static::lazy_static;
use regex::Regex;

use super::{DocumentModel, ModelDescriptor, PeriodPolicy};
use crate::models::record::ExtractionRecord;
use crate::rules::patterns::REAIS_AMOUNT;
use crate::rules::{clamp_score, first_capture, keyword_score};

lazy_static! {
    static ref HIRING_PARTY: Regex =
        Regex::new(r"(?m)[Cc]ontratante[:\s]*(.+?)(?:,\s*(?:inscrit|CNPJ|CPF)|$)").unwrap();
    static ref HIRED_PARTY: Regex =
        Regex::new(r"(?m)[Cc]ontratad[oa][:\s]*(.+?)(?:,\s*(?:inscrit|CNPJ|CPF)|$)").unwrap();
}

const KEYWORDS: [(&str, f32); 6] = [
    ("contrato", 0.25),
    ("contratante", 0.20),
    ("contratado", 0.20),
    ("cláusula", 0.20),
    ("vigência", 0.10),
    ("testemunhas", 0.10),
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Contrato",
    icon: "file-signature",
    description: "Contrato / Acordo / Termo",
    category: "Contrato",
    variant: "Padrão",
    period: PeriodPolicy::PerPage,
    requires_cleaning: false,
};

pub struct Contrato;

impl Contrato {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Contrato {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel for Contrato {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        clamp_score(keyword_score(&text.to_lowercase(), &KEYWORDS))
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::scalar("Contrato");
        record.set_opt("contratante", first_capture(&[&*HIRING_PARTY], text));
        record.set_opt("contratado", first_capture(&[&*HIRED_PARTY], text));
        record.set_opt("valor", first_capture(&[&*REAIS_AMOUNT], text));
        record
    }
}
