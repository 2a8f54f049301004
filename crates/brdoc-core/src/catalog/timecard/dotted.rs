//! Timecard with dotted dates (`04.03.2024 Seg`) and `HH:MM:SS` punches.
//!
//! Only the first two times of a row are real punches, the rest are the
//! standard meal break.

use lazy_static::lazy_static;
use regex::Regex;

use super::{has_marker, set_header, title_score, DayRow, DayStatus, CATEGORY, ICON, PERIOD};
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::patterns::TIME_WITH_SECONDS;
use crate::rules::{clamp_score, first_capture, first_captures, keyword_score, normalize_time};

lazy_static! {
    static ref ROW: Regex =
        Regex::new(r"(?i)^(\d{2}\.\d{2}\.\d{4})\s+(Dom|Seg|Ter|Qua|Qui|Sex|Sáb|Sab)\b").unwrap();
    static ref DOTTED_ROWS: Regex =
        Regex::new(r"(?im)^\s*\d{2}\.\d{2}\.\d{4}\s+(?:Dom|Seg|Ter|Qua|Qui|Sex|Sáb|Sab)\b").unwrap();
    static ref EMPLOYEE: Regex =
        Regex::new(r"(?m)Funcionário:\s*\d+\s+(.+?)(?:\s+Centro de custo|\s*$)").unwrap();
    static ref PERIOD_RANGE: Regex =
        Regex::new(r"(?i)Período:\s*(\d{2}\.\d{2}\.\d{4})\s*a\s*(\d{2}\.\d{2}\.\d{4})").unwrap();
    static ref ROLE: Regex = Regex::new(r"(?m)Cargo:(.+?)$").unwrap();
}

const ABSENCE_MARKERS: [&str; 2] = ["falta", "ausente"];

const KEYWORDS: [(&str, f32); 2] = [("funcionário:", 0.10), ("cargo:", 0.05)];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Cartão Ponto — Data com Pontos",
    icon: ICON,
    description: "Cartão ponto com datas DD.MM.YYYY e horários HH:MM:SS",
    category: CATEGORY,
    variant: "Data com pontos",
    period: PERIOD,
    requires_cleaning: false,
};

pub struct DottedTimecard;

impl DottedTimecard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DottedTimecard {
    fn default() -> Self {
        Self::new()
    }
}

fn slashed(date: &str) -> String {
    date.replace('.', "/")
}

fn parse_day(line: &str) -> Option<DayRow> {
    let caps = ROW.captures(line)?;
    let date = slashed(&caps[1]);
    let weekday = &caps[2];
    let rest = line[caps[0].len()..].trim();

    let times: Vec<String> = TIME_WITH_SECONDS
        .find_iter(rest)
        .filter_map(|m| normalize_time(m.as_str()))
        .take(2)
        .collect();

    if times.is_empty() {
        let status = if has_marker(rest, &ABSENCE_MARKERS) {
            DayStatus::Ausente
        } else {
            DayStatus::Folga
        };
        return Some(DayRow::absent(date, weekday, status).with_obs(rest));
    }

    let day = DayRow::new(date, weekday).with_punches(times);
    if rest.contains("Banco de Horas") || rest.contains("Compens.") {
        return Some(day.with_obs(rest));
    }
    Some(day)
}

impl DocumentModel for DottedTimecard {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let lowered = text.to_lowercase();
        let mut score = title_score(&lowered, 0.15) + keyword_score(&lowered, &KEYWORDS);
        if DOTTED_ROWS.find_iter(text).count() > 5 {
            score += 0.45;
        }
        if TIME_WITH_SECONDS.is_match(text) {
            score += 0.15;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::tabular("Cartão Ponto", RowsLabel::Registros);
        let period = first_captures(&[&*PERIOD_RANGE], text)
            .map(|g| (slashed(&g[0]), slashed(&g[1])));
        set_header(&mut record, first_capture(&[&*EMPLOYEE], text), period);
        record.set_opt("cargo", first_capture(&[&*ROLE], text));

        for line in text_lines(text) {
            if let Some(day) = parse_day(line) {
                record.push_row(day.into_fields());
            }
        }

        record
    }
}
