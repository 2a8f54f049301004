//! Model registry and selection.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use super::boleto::Boleto;
use super::contract::Contrato;
use super::invoice::{NotaFiscal, NotaServico};
use super::payslip::{
    CompetencePayslip, FourDigitPayslip, OrgUnitPayslip, PipePayslip, SecrecyPayslip,
    StandardPayslip, TextualMonthPayslip, TwoColumnPayslip,
};
use super::receipt::Recibo;
use super::statement::Extrato;
use super::timecard::{
    DottedTimecard, HorizontalTimecard, MultilineTimecard, PontoMaisTimecard, SecrecyTimecard,
    ShortDateTimecard,
};
use super::DocumentModel;
use crate::error::{ExtractionError, Result};
use crate::models::record::{ExtractionRecord, Table};

/// Pseudo model name that asks for detection.
pub const AUTO_DETECT: &str = "Auto-Detectar";

/// Outcome of running a text through the registry.
#[derive(Debug, Clone, Serialize)]
pub struct Processed {
    /// Name of the model that extracted the record, if any.
    pub model: Option<&'static str>,
    /// Detection score, absent when the model was chosen by name.
    pub score: Option<f32>,
    pub record: ExtractionRecord,
    pub table: Table,
}

impl Processed {
    fn unmatched() -> Self {
        Self {
            model: None,
            score: None,
            record: ExtractionRecord::empty(),
            table: Table::empty(),
        }
    }
}

/// Ordered, immutable collection of document models.
pub struct ModelRegistry {
    models: Vec<Box<dyn DocumentModel>>,
}

impl ModelRegistry {
    /// Registry over the given models, in priority order.
    pub fn from_models(models: Vec<Box<dyn DocumentModel>>) -> Self {
        Self { models }
    }

    /// Every built-in layout. Registration order breaks detection ties.
    pub fn builtin() -> Self {
        Self::from_models(vec![
            Box::new(StandardPayslip::new()),
            Box::new(PipePayslip::new()),
            Box::new(TextualMonthPayslip::new()),
            Box::new(FourDigitPayslip::new()),
            Box::new(TwoColumnPayslip::new()),
            Box::new(SecrecyPayslip::new()),
            Box::new(CompetencePayslip::new()),
            Box::new(OrgUnitPayslip::new()),
            Box::new(HorizontalTimecard::new()),
            Box::new(ShortDateTimecard::new()),
            Box::new(PontoMaisTimecard::new()),
            Box::new(SecrecyTimecard::new()),
            Box::new(DottedTimecard::new()),
            Box::new(MultilineTimecard::new()),
            Box::new(NotaFiscal::new()),
            Box::new(NotaServico::new()),
            Box::new(Boleto::new()),
            Box::new(Recibo::new()),
            Box::new(Extrato::new()),
            Box::new(Contrato::new()),
        ])
    }

    pub fn models(&self) -> impl Iterator<Item = &dyn DocumentModel> {
        self.models.iter().map(|m| m.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.models().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Look up a model by its display name.
    pub fn get(&self, name: &str) -> Option<&dyn DocumentModel> {
        self.models().find(|m| m.name() == name)
    }

    /// Like [`get`](Self::get), failing with [`ExtractionError::UnknownModel`].
    pub fn resolve(&self, name: &str) -> Result<&dyn DocumentModel> {
        self.get(name)
            .ok_or_else(|| ExtractionError::UnknownModel(name.to_string()).into())
    }

    /// Models grouped by category, categories in first-registered order.
    pub fn categories(&self) -> IndexMap<&'static str, Vec<&dyn DocumentModel>> {
        let mut groups: IndexMap<&'static str, Vec<&dyn DocumentModel>> = IndexMap::new();
        for model in self.models() {
            groups
                .entry(model.descriptor().category)
                .or_default()
                .push(model);
        }
        groups
    }

    /// Detection score of every model, in registration order.
    pub fn scores(&self, text: &str) -> Vec<(&'static str, f32)> {
        self.models().map(|m| (m.name(), m.detect(text))).collect()
    }

    /// The model with the strictly highest score. The first registered model
    /// wins ties; when every score is zero there is no match.
    pub fn auto_detect(&self, text: &str) -> Option<(&dyn DocumentModel, f32)> {
        let mut best: Option<(&dyn DocumentModel, f32)> = None;
        for model in self.models() {
            let score = model.detect(text);
            debug!("Detection score {:.2} for {}", score, model.name());
            match best {
                Some((_, top)) if score <= top => {}
                _ if score > 0.0 => best = Some((model, score)),
                _ => {}
            }
        }
        best
    }

    /// Extract `text` with the named model, or with the detected one when the
    /// name is absent, [`AUTO_DETECT`] or unknown.
    pub fn process(&self, text: &str, name: Option<&str>) -> Processed {
        let chosen = match name.filter(|n| *n != AUTO_DETECT) {
            Some(name) => match self.get(name) {
                Some(model) => Some((model, None)),
                None => {
                    warn!("Unknown model '{}', falling back to detection", name);
                    self.auto_detect(text).map(|(m, s)| (m, Some(s)))
                }
            },
            None => self.auto_detect(text).map(|(m, s)| (m, Some(s))),
        };

        let Some((model, score)) = chosen else {
            debug!("No model matched");
            return Processed::unmatched();
        };

        let record = model.extract(text);
        let table = model.to_table(&record);
        Processed {
            model: Some(model.name()),
            score,
            record,
            table,
        }
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
