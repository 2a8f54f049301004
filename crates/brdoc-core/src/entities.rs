//! Generic entity extraction over free text.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::catalog::ModelRegistry;
use crate::rules::patterns::{
    CEP, CHAVE_NFE, CNPJ, CPF, EMAIL, ENTITY_DATE, ENTITY_MONEY, ENTITY_TIME, LICENSE_PLATE,
    LINHA_DIGITAVEL, PERCENTAGE, PHONE, PIS_PASEP, RG, STATE_REGISTRATION,
};

/// Minimum detection score for the document type to name a model.
const MODEL_CONFIDENCE_FLOOR: f32 = 0.3;

/// Keyword fallbacks for the document type, checked in order.
const TYPE_FALLBACKS: [(&[&str], &str); 6] = [
    (&["nota fiscal", "danfe"], "Nota Fiscal / DANFE"),
    (&["recibo"], "Recibo de Pagamento"),
    (&["contrato"], "Contrato / Acordo"),
    (&["boleto", "banco"], "Boleto Bancário"),
    (&["contracheque", "holerite"], "Contracheque / Holerite"),
    (&["extrato"], "Extrato Bancário"),
];

const GENERIC_DOCUMENT: &str = "Documento Genérico";

/// Kinds of entity recognized in free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Cpf,
    Cnpj,
    Data,
    ValorMonetario,
    Email,
    Telefone,
    Cep,
    Rg,
    PisPasep,
    LinhaDigitavel,
    ChaveNfe,
    Horario,
    Percentual,
    PlacaVeiculo,
    InscricaoEstadual,
}

impl EntityKind {
    /// Every kind, in report order.
    pub const ALL: [EntityKind; 15] = [
        EntityKind::Cpf,
        EntityKind::Cnpj,
        EntityKind::Data,
        EntityKind::ValorMonetario,
        EntityKind::Email,
        EntityKind::Telefone,
        EntityKind::Cep,
        EntityKind::Rg,
        EntityKind::PisPasep,
        EntityKind::LinhaDigitavel,
        EntityKind::ChaveNfe,
        EntityKind::Horario,
        EntityKind::Percentual,
        EntityKind::PlacaVeiculo,
        EntityKind::InscricaoEstadual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Cpf => "cpf",
            EntityKind::Cnpj => "cnpj",
            EntityKind::Data => "data",
            EntityKind::ValorMonetario => "valor_monetario",
            EntityKind::Email => "email",
            EntityKind::Telefone => "telefone",
            EntityKind::Cep => "cep",
            EntityKind::Rg => "rg",
            EntityKind::PisPasep => "pis_pasep",
            EntityKind::LinhaDigitavel => "linha_digitavel",
            EntityKind::ChaveNfe => "chave_nfe",
            EntityKind::Horario => "horario",
            EntityKind::Percentual => "percentual",
            EntityKind::PlacaVeiculo => "placa_veiculo",
            EntityKind::InscricaoEstadual => "inscricao_estadual",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            EntityKind::Cpf => &*CPF,
            EntityKind::Cnpj => &*CNPJ,
            EntityKind::Data => &*ENTITY_DATE,
            EntityKind::ValorMonetario => &*ENTITY_MONEY,
            EntityKind::Email => &*EMAIL,
            EntityKind::Telefone => &*PHONE,
            EntityKind::Cep => &*CEP,
            EntityKind::Rg => &*RG,
            EntityKind::PisPasep => &*PIS_PASEP,
            EntityKind::LinhaDigitavel => &*LINHA_DIGITAVEL,
            EntityKind::ChaveNfe => &*CHAVE_NFE,
            EntityKind::Horario => &*ENTITY_TIME,
            EntityKind::Percentual => &*PERCENTAGE,
            EntityKind::PlacaVeiculo => &*LICENSE_PLATE,
            EntityKind::InscricaoEstadual => &*STATE_REGISTRATION,
        }
    }

    /// Distinct matches of this kind, sorted.
    pub fn find_all(&self, text: &str) -> BTreeSet<String> {
        self.pattern()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Entities found in a text plus a guess of its document type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityReport {
    /// Non-empty categories only, in [`EntityKind::ALL`] order.
    pub entities: IndexMap<EntityKind, BTreeSet<String>>,
    #[serde(rename = "TIPO_DOC")]
    pub document_type: String,
}

impl EntityReport {
    pub fn get(&self, kind: EntityKind) -> Option<&BTreeSet<String>> {
        self.entities.get(&kind)
    }
}

/// Run every entity pattern over `text` and guess the document type.
///
/// The type names the best catalog model when its score clears 0.3, otherwise
/// falls back to keyword hints.
pub fn extract_entities(text: &str, registry: &ModelRegistry) -> EntityReport {
    let entities = EntityKind::ALL
        .iter()
        .map(|kind| (*kind, kind.find_all(text)))
        .filter(|(_, found)| !found.is_empty())
        .collect();

    EntityReport {
        entities,
        document_type: guess_document_type(text, registry),
    }
}

fn guess_document_type(text: &str, registry: &ModelRegistry) -> String {
    if let Some((model, score)) = registry.auto_detect(text) {
        if score > MODEL_CONFIDENCE_FLOOR {
            return format!("{} (confiança: {:.0}%)", model.name(), score * 100.0);
        }
    }

    let lowered = text.to_lowercase();
    TYPE_FALLBACKS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| GENERIC_DOCUMENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_entities_deduplicated_and_sorted() {
        let registry = ModelRegistry::builtin();
        let text = "CPF 987.654.321-00 e 123.456.789-09, de novo 987.654.321-00\n\
                    contato: fulano@empresa.com.br às 14:30, desconto de 5%";
        let report = extract_entities(text, &registry);

        assert_eq!(
            report.get(EntityKind::Cpf),
            Some(&set(&["123.456.789-09", "987.654.321-00"]))
        );
        assert_eq!(report.get(EntityKind::Email), Some(&set(&["fulano@empresa.com.br"])));
        assert_eq!(report.get(EntityKind::Horario), Some(&set(&["14:30"])));
        assert_eq!(report.get(EntityKind::Percentual), Some(&set(&["5%"])));
        assert_eq!(report.get(EntityKind::Cnpj), None);
    }

    #[test]
    fn test_categories_in_report_order() {
        let registry = ModelRegistry::builtin();
        let report = extract_entities("CEP 01310-100, CNPJ 12.345.678/0001-90", &registry);
        let kinds: Vec<EntityKind> = report.entities.keys().copied().collect();
        assert_eq!(kinds, vec![EntityKind::Cnpj, EntityKind::Cep]);
    }

    #[test]
    fn test_document_type_from_model() {
        let registry = ModelRegistry::builtin();
        let report = extract_entities("RECIBO\nRecebi de FULANO a importância de R$ 10,00", &registry);
        assert_eq!(report.document_type, "Recibo de Pagamento (confiança: 80%)");
    }

    #[test]
    fn test_document_type_fallbacks() {
        let registry = ModelRegistry::builtin();
        assert_eq!(
            extract_entities("Segue o contrato anexo", &registry).document_type,
            "Contrato / Acordo"
        );
        assert_eq!(
            extract_entities("texto qualquer", &registry).document_type,
            "Documento Genérico"
        );
    }

    #[test]
    fn test_report_serializes_kind_names() {
        let registry = ModelRegistry::builtin();
        let report = extract_entities("placa ABC-1D23", &registry);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entities"]["placa_veiculo"][0], "ABC-1D23");
        assert_eq!(json["TIPO_DOC"], "Documento Genérico");
    }
}
