//! Timecard (cartão ponto) layouts.
//!
//! Every layout produces a tabular record with one `registros` row per day.
//! A row always carries the four punch columns; absent days leave them empty.

pub mod dotted;
pub mod horizontal;
pub mod multiline;
pub mod pontomais;
pub mod secrecy;
pub mod short_date;

pub use dotted::DottedTimecard;
pub use horizontal::HorizontalTimecard;
pub use multiline::MultilineTimecard;
pub use pontomais::PontoMaisTimecard;
pub use secrecy::SecrecyTimecard;
pub use short_date::ShortDateTimecard;

use lazy_static::lazy_static;
use regex::Regex;

use super::PeriodPolicy;
use crate::models::record::{ExtractionRecord, Fields};

lazy_static! {
    // Day rows with a full date, anywhere on a line
    pub(crate) static ref FULL_DATE_ROW: Regex = Regex::new(
        r"(?i)\d{2}/\d{2}/\d{4}\s+(?:Seg|Ter|Qua|Qui|Sex|Sáb|Sab|Dom)"
    ).unwrap();

    // Day rows with `DD/MM` at the start of a line
    pub(crate) static ref SHORT_DATE_ROW: Regex = Regex::new(
        r"(?im)^\s*\d{2}/\d{2}\s+(?:seg|ter|qua|qui|sex|sáb|sab|dom)"
    ).unwrap();
}

pub const CATEGORY: &str = "Cartão Ponto";
pub const ICON: &str = "clock";
pub const DATE_FIELD: &str = "data";
pub const PERIOD: PeriodPolicy = PeriodPolicy::PerRow(DATE_FIELD);

const PUNCH_FIELDS: [&str; 4] = ["entrada1", "saida1", "entrada2", "saida2"];

/// Day classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Normal,
    Folga,
    Ausente,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Normal => "Normal",
            DayStatus::Folga => "Folga",
            DayStatus::Ausente => "Ausente",
        }
    }
}

/// One day of a timecard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    pub data: String,
    pub dia_semana: String,
    pub status: DayStatus,
    pub punches: Vec<String>,
    pub obs: Option<String>,
}

impl DayRow {
    pub fn new(data: impl Into<String>, dia_semana: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            dia_semana: dia_semana.into(),
            status: DayStatus::Normal,
            punches: Vec::new(),
            obs: None,
        }
    }

    /// An absent day: the punches stay empty.
    pub fn absent(data: impl Into<String>, dia_semana: impl Into<String>, status: DayStatus) -> Self {
        Self {
            status,
            ..Self::new(data, dia_semana)
        }
    }

    pub fn with_punches(mut self, punches: Vec<String>) -> Self {
        self.punches = punches;
        self
    }

    pub fn with_obs(mut self, obs: impl Into<String>) -> Self {
        let obs = obs.into();
        self.obs = if obs.trim().is_empty() {
            None
        } else {
            Some(obs.trim().to_string())
        };
        self
    }

    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(DATE_FIELD.to_string(), self.data);
        fields.insert("dia_semana".to_string(), self.dia_semana);
        fields.insert("status".to_string(), self.status.as_str().to_string());

        let mut punches = self.punches.into_iter();
        for key in PUNCH_FIELDS {
            fields.insert(key.to_string(), punches.next().unwrap_or_default());
        }

        if let Some(obs) = self.obs {
            fields.insert("obs".to_string(), obs);
        }
        fields
    }
}

/// Whether the lower-cased line contains any absence marker.
pub fn has_marker(line: &str, markers: &[&str]) -> bool {
    let lowered = line.to_lowercase();
    markers.iter().any(|m| lowered.contains(m))
}

/// `weight` when the text carries one of the timecard titles.
pub(crate) fn title_score(lowered: &str, weight: f32) -> f32 {
    if ["cartão ponto", "cartao ponto", "espelho de ponto"]
        .iter()
        .any(|t| lowered.contains(t))
    {
        weight
    } else {
        0.0
    }
}

/// Copy the employee and period header fields onto the record.
pub(crate) fn set_header(
    record: &mut ExtractionRecord,
    funcionario: Option<String>,
    period: Option<(String, String)>,
) {
    record.set_opt("funcionario", funcionario);
    if let Some((start, end)) = period {
        record.set("periodo_inicio", start);
        record.set("periodo_fim", end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absent_row_has_empty_punches() {
        let fields = DayRow::absent("01/03/2024", "Sex", DayStatus::Folga).into_fields();
        assert_eq!(fields["status"], "Folga");
        for key in PUNCH_FIELDS {
            assert_eq!(fields[key], "");
        }
        assert!(!fields.contains_key("obs"));
    }

    #[test]
    fn test_row_field_order() {
        let fields = DayRow::new("02/03/2024", "Sáb")
            .with_punches(vec!["08:00".to_string(), "12:00".to_string()])
            .with_obs(" Atestado ")
            .into_fields();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["data", "dia_semana", "status", "entrada1", "saida1", "entrada2", "saida2", "obs"]
        );
        assert_eq!(fields["saida1"], "12:00");
        assert_eq!(fields["entrada2"], "");
        assert_eq!(fields["obs"], "Atestado");
    }

    #[test]
    fn test_has_marker() {
        assert!(has_marker("05/03/2024 Ter FOLGA", &["folga"]));
        assert!(!has_marker("05/03/2024 Ter 08:00", &["folga"]));
    }
}
