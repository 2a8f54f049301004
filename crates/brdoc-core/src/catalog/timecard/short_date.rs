//! Short-date timecard: rows start with `DD/MM <dia>`, the year comes from the
//! period header.

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    has_marker, set_header, title_score, DayRow, DayStatus, CATEGORY, FULL_DATE_ROW, ICON, PERIOD,
    SHORT_DATE_ROW,
};
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::dates::{reconstruct_year, PeriodRange};
use crate::rules::patterns::TIME_HHMM;
use crate::rules::{clamp_score, first_capture, first_captures, PunchFilter};

lazy_static! {
    static ref ROW: Regex = Regex::new(r"(?i)^(\d{2}/\d{2})\s+([a-záéíóúâê]+)").unwrap();
    static ref RANGE_A: Regex =
        Regex::new(r"(\d{2}/\d{2}/\d{4})\s+[àa]\s+(\d{2}/\d{2}/\d{4})").unwrap();
    static ref RANGE_DE_ATE: Regex =
        Regex::new(r"(?i)Período\s+De\s+(\d{2}/\d{2}/\d{4})\s+Até\s+(\d{2}/\d{2}/\d{4})").unwrap();
    static ref RANGE_COLON: Regex =
        Regex::new(r"(?i)Período\s*:\s*(\d{2}/\d{2}/\d{4})\s+a\s+(\d{2}/\d{2}/\d{4})").unwrap();
    static ref EMPLOYEE: Regex =
        Regex::new(r"(?m)(?:Empregado|Funcionário|Nome):\s*(?:\d+\s*-\s*)?(.+?)(?:\s{2,}|\s+Matrícula|\s+CPF|\s*$)")
            .unwrap();
}

const SCHEDULED_PREFIX: usize = 4;
const DAY_OFF_MARKERS: [&str; 4] = ["folga", "feriado", "(f)", "n.admitido"];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Cartão Ponto — Curta",
    icon: ICON,
    description: "Cartão ponto com datas DD/MM e ano reconstruído pelo período",
    category: CATEGORY,
    variant: "Curta (DD/MM)",
    period: PERIOD,
    requires_cleaning: false,
};

pub struct ShortDateTimecard;

impl ShortDateTimecard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShortDateTimecard {
    fn default() -> Self {
        Self::new()
    }
}

/// The period header, trying each layout in order.
fn period_bounds(text: &str) -> Option<(String, String)> {
    first_captures(&[&*RANGE_A, &*RANGE_DE_ATE, &*RANGE_COLON], text)
        .map(|g| (g[0].clone(), g[1].clone()))
}

impl DocumentModel for ShortDateTimecard {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let mut score = title_score(&text.to_lowercase(), 0.25);

        let full_rows = FULL_DATE_ROW.find_iter(text).count();
        let short_rows = SHORT_DATE_ROW.find_iter(text).count();
        if short_rows > 5 {
            score += 0.35;
        }
        if RANGE_A.is_match(text) {
            score += 0.15;
        }
        if full_rows > short_rows {
            score -= 0.20;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::tabular("Cartão Ponto (Curta)", RowsLabel::Registros);
        let bounds = period_bounds(text);
        let range = bounds
            .as_ref()
            .and_then(|(start, end)| PeriodRange::parse(start, end));
        set_header(&mut record, first_capture(&[&*EMPLOYEE], text), bounds);

        let filter = PunchFilter::new().with_scheduled_prefix(SCHEDULED_PREFIX);
        for line in text_lines(text) {
            let Some(caps) = ROW.captures(line) else {
                continue;
            };
            let (day_month, weekday) = (&caps[1], &caps[2]);
            let date = range
                .as_ref()
                .and_then(|r| reconstruct_year(day_month, r))
                .unwrap_or_else(|| day_month.to_string());
            let rest = &line[caps[0].len()..];

            let day = if has_marker(rest, &DAY_OFF_MARKERS) {
                DayRow::absent(date, weekday, DayStatus::Folga)
            } else {
                let candidates: Vec<&str> = TIME_HHMM.find_iter(rest).map(|m| m.as_str()).collect();
                DayRow::new(date, weekday).with_punches(filter.filter(&candidates))
            };
            record.push_row(day.into_fields());
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
ESPELHO DE PONTO
Funcionário: 77 - JOAO PEREIRA  Matrícula 77
16/12/2023 a 15/01/2024
30/12 sab FOLGA
31/12 dom feriado
02/01 ter 08:00 12:00 13:00 17:00 08:03 12:01 13:00 17:10
03/01 qua 08:00 12:00 13:00 17:00 07:55 12:05
04/01 qui 08:00 12:00 13:00 17:00 (F)
05/01 sex 08:00 12:00 13:00 17:00 08:00 11:58 12:59 17:00
";

    #[test]
    fn test_detect() {
        let model = ShortDateTimecard::new();
        let score = model.detect(SAMPLE);
        assert!(score > 0.7, "score was {}", score);
    }

    #[test]
    fn test_period_strategies() {
        assert_eq!(
            period_bounds("Período De 01/02/2024 Até 29/02/2024"),
            Some(("01/02/2024".to_string(), "29/02/2024".to_string()))
        );
        assert_eq!(
            period_bounds("Período : 01/02/2024 a 29/02/2024"),
            Some(("01/02/2024".to_string(), "29/02/2024".to_string()))
        );
        assert_eq!(period_bounds("sem período"), None);
    }

    #[test]
    fn test_extract_reconstructs_year() {
        let record = ShortDateTimecard::new().extract(SAMPLE);
        assert_eq!(record.get("funcionario"), Some("JOAO PEREIRA"));
        assert_eq!(record.get("periodo_inicio"), Some("16/12/2023"));

        let rows = record.rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["data"], "30/12/2023");
        assert_eq!(rows[0]["status"], "Folga");
        assert_eq!(rows[1]["status"], "Folga");
        assert_eq!(rows[2]["data"], "02/01/2024");
        assert_eq!(rows[2]["entrada1"], "08:03");
        assert_eq!(rows[2]["saida2"], "17:10");
        assert_eq!(rows[3]["saida1"], "12:05");
        assert_eq!(rows[4]["status"], "Folga");
        assert_eq!(rows[5]["entrada1"], "08:00");
        assert_eq!(rows[5]["saida2"], "17:00");
    }

    #[test]
    fn test_extract_without_period_keeps_short_date() {
        let record = ShortDateTimecard::new().extract("10/05 sex 08:00 12:00");
        assert_eq!(record.rows()[0]["data"], "10/05");
        assert_eq!(record.rows()[0]["saida1"], "12:00");
    }
}
