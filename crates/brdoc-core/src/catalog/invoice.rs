//! Electronic invoices: NF-e (DANFE) and NFS-e (service invoice).

use lazy_static::lazy_static;
use regex::Regex;

use super::{DocumentModel, ModelDescriptor, PeriodPolicy};
use crate::models::record::ExtractionRecord;
use crate::rules::patterns::{CNPJ, REAIS_AMOUNT};
use crate::rules::{clamp_score, first_capture, keyword_score};

lazy_static! {
    static ref NF_NUMBER: Regex =
        Regex::new(r"(?i)(?:N[°ºo.]?\s*|Número[:\s]*)(\d{3,9})").unwrap();
    static ref ACCESS_KEY: Regex =
        Regex::new(r"(\d{4}(?:\s?\d{4}){10})").unwrap();
    static ref TOTAL_VALUE: Regex =
        Regex::new(r"(?i)(?:valor\s+total|total\s+da\s+nota)[:\s]*R?\$?\s*([\d.,]+)").unwrap();
    static ref ISSUE_DATE: Regex =
        Regex::new(r"(?i)(?:emissão|emissao)[:\s]*(\d{2}/\d{2}/\d{4})").unwrap();

    static ref NFSE_NUMBER: Regex =
        Regex::new(r"(?i)(?:NFS-e\s*N[°ºo.]?\s*|N[°ºo.]\s*)(\d+)").unwrap();
    static ref PROVIDER: Regex =
        Regex::new(r"(?m)[Pp]restador[:\s]*(.+?)(?:CNPJ|$)").unwrap();
    static ref TAKER: Regex =
        Regex::new(r"(?m)[Tt]omador[:\s]*(.+?)(?:CNPJ|CPF|$)").unwrap();
}

pub const CATEGORY: &str = "Nota Fiscal";

const NFE_KEYWORDS: [(&str, f32); 9] = [
    ("nota fiscal", 0.30),
    ("danfe", 0.35),
    ("nf-e", 0.30),
    ("chave de acesso", 0.20),
    ("icms", 0.10),
    ("destinatário", 0.10),
    ("emitente", 0.10),
    ("cfop", 0.10),
    ("natureza da operação", 0.10),
];

const NFSE_KEYWORDS: [(&str, f32); 6] = [
    ("nfs-e", 0.35),
    ("nota fiscal de serviço", 0.35),
    ("prestador", 0.15),
    ("tomador", 0.15),
    ("iss", 0.10),
    ("issqn", 0.15),
];

static NFE_DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Nota Fiscal (NF-e)",
    icon: "file-invoice-dollar",
    description: "Nota Fiscal Eletrônica / DANFE",
    category: CATEGORY,
    variant: "NF-e / DANFE",
    period: PeriodPolicy::DocumentField("data_emissao"),
    requires_cleaning: false,
};

static NFSE_DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Nota de Serviço (NFS-e)",
    icon: "file-invoice",
    description: "Nota Fiscal de Serviço Eletrônica",
    category: CATEGORY,
    variant: "NFS-e",
    period: PeriodPolicy::PerPage,
    requires_cleaning: false,
};

/// Goods invoice (NF-e) printed as a DANFE.
pub struct NotaFiscal;

impl NotaFiscal {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NotaFiscal {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel for NotaFiscal {
    fn descriptor(&self) -> &ModelDescriptor {
        &NFE_DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        clamp_score(keyword_score(&text.to_lowercase(), &NFE_KEYWORDS))
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::scalar("Nota Fiscal");
        record.set_opt("numero_nf", first_capture(&[&*NF_NUMBER], text));
        record.set_opt(
            "chave_acesso",
            first_capture(&[&*ACCESS_KEY], text).map(|key| key.replace(' ', "")),
        );

        let mut cnpjs = CNPJ.find_iter(text).map(|m| m.as_str());
        record.set_opt("cnpj_emitente", cnpjs.next());
        record.set_opt("cnpj_destinatario", cnpjs.next());

        record.set_opt("valor_total", first_capture(&[&*TOTAL_VALUE], text));
        record.set_opt("data_emissao", first_capture(&[&*ISSUE_DATE], text));
        record
    }
}

/// Municipal service invoice.
pub struct NotaServico;

impl NotaServico {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NotaServico {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel for NotaServico {
    fn descriptor(&self) -> &ModelDescriptor {
        &NFSE_DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        clamp_score(keyword_score(&text.to_lowercase(), &NFSE_KEYWORDS))
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::scalar("NFS-e");
        record.set_opt("numero", first_capture(&[&*NFSE_NUMBER], text));
        record.set_opt("prestador", first_capture(&[&*PROVIDER], text));
        record.set_opt("tomador", first_capture(&[&*TAKER], text));
        record.set_opt("valor_servico", first_capture(&[&*REAIS_AMOUNT], text));
        record.set_opt("cnpj_prestador", CNPJ.find(text).map(|m| m.as_str()));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DANFE: &str = "\
DANFE - Documento Auxiliar da Nota Fiscal Eletrônica
Nº 000123456 Série 1
CHAVE DE ACESSO
3524 0112 3456 7800 0190 5500 1000 1234 5610 0012 3456
EMITENTE: ACME COMERCIO LTDA CNPJ 12.345.678/0001-90
DESTINATÁRIO: CLIENTE SA CNPJ 98.765.432/0001-10
Data de Emissão: 15/01/2024
CFOP 5102 ICMS 18%
VALOR TOTAL DA NOTA R$ 1.530,75
";

    const NFSE: &str = "\
NOTA FISCAL DE SERVIÇO ELETRÔNICA - NFS-e Nº 2024
Prestador: ESCRITORIO CONTABIL ALFA CNPJ 11.222.333/0001-44
Tomador: MARIA DA SILVA CPF 123.456.789-09
Valor dos serviços R$ 850,00
ISSQN retido R$ 42,50
";

    #[test]
    fn test_nfe_detect() {
        let model = NotaFiscal::new();
        assert!(model.detect(DANFE) > 0.9);
        assert!(model.detect("lista de compras") == 0.0);
        assert!(model.detect(DANFE) > NotaServico::new().detect(DANFE));
    }

    #[test]
    fn test_nfe_extract() {
        let record = NotaFiscal::new().extract(DANFE);
        assert_eq!(record.document_type(), Some("Nota Fiscal"));
        assert_eq!(record.get("numero_nf"), Some("000123456"));
        assert_eq!(
            record.get("chave_acesso"),
            Some("35240112345678000190550010001234561000123456")
        );
        assert_eq!(record.get("cnpj_emitente"), Some("12.345.678/0001-90"));
        assert_eq!(record.get("cnpj_destinatario"), Some("98.765.432/0001-10"));
        assert_eq!(record.get("data_emissao"), Some("15/01/2024"));
        assert_eq!(record.get("valor_total"), Some("1.530,75"));
    }

    #[test]
    fn test_nfe_total_value() {
        let record = NotaFiscal::new().extract("Valor total: R$ 99,90");
        assert_eq!(record.get("valor_total"), Some("99,90"));
        assert_eq!(record.get("cnpj_emitente"), None);
    }

    #[test]
    fn test_nfse_detect() {
        let model = NotaServico::new();
        assert!(model.detect(NFSE) > 0.9);
        assert!(model.detect(NFSE) > NotaFiscal::new().detect(NFSE));
    }

    #[test]
    fn test_nfse_extract() {
        let record = NotaServico::new().extract(NFSE);
        assert_eq!(record.document_type(), Some("NFS-e"));
        assert_eq!(record.get("numero"), Some("2024"));
        assert_eq!(record.get("prestador"), Some("ESCRITORIO CONTABIL ALFA"));
        assert_eq!(record.get("tomador"), Some("MARIA DA SILVA"));
        assert_eq!(record.get("valor_servico"), Some("850,00"));
        assert_eq!(record.get("cnpj_prestador"), Some("11.222.333/0001-44"));
    }
}
