//! Multi-line timecard: a `DD/MM - <Dia>` anchor line is followed by the
//! planned shift, occurrence notes and at most one line of real punches.

use lazy_static::lazy_static;
use regex::Regex;

use super::{has_marker, set_header, DayRow, DayStatus, CATEGORY, ICON, PERIOD};
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::dates::{reconstruct_year, PeriodRange};
use crate::rules::patterns::{PLANNED_SHIFT, TIME_LOOSE};
use crate::rules::{clamp_score, first_capture, first_captures, keyword_score, normalize_time};

lazy_static! {
    static ref ANCHOR: Regex =
        Regex::new(r"(?i)^(\d{2}/\d{2})\s+-\s+(Dom|Seg|Ter|Qua|Qui|Sex|Sáb|Sab)\b").unwrap();
    static ref ANCHORS: Regex =
        Regex::new(r"(?im)^\s*\d{2}/\d{2}\s+-\s+(?:Dom|Seg|Ter|Qua|Qui|Sex|Sáb|Sab)\b").unwrap();
    static ref EMPLOYEE: Regex =
        Regex::new(r"(?m)Funcionário:\s*(.+?)(?:\s+Matrícula:|\s*$)").unwrap();
    static ref PERIOD_RANGE: Regex =
        Regex::new(r"(?i)Período:\s*(\d{2}/\d{2}/\d{4})\s*a\s*(\d{2}/\d{2}/\d{4})").unwrap();
}

/// Lines skipped without ending the day.
const IGNORED: [&str; 8] = [
    "documento assinado",
    "fls.:",
    "calamidade",
    "crédito",
    "dsr",
    "feriado",
    "férias",
    "irregulares",
];

/// Footer lines after which no punch is read for the day.
const DAY_END: [&str; 4] = ["banco de horas", "saldo", "eventos gerados", "horas contratuais"];

const DAY_OFF_MARKERS: [&str; 3] = ["folga", "feriado", "compensar"];

const KEYWORDS: [(&str, f32); 5] = [
    ("cartão ponto", 0.15),
    ("espelho de ponto", 0.15),
    ("funcionário:", 0.08),
    ("período:", 0.08),
    ("banco de horas", 0.05),
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Cartão Ponto — Multilinha",
    icon: ICON,
    description: "Cartão ponto com um bloco de linhas por dia (DD/MM - Dia)",
    category: CATEGORY,
    variant: "Multilinha",
    period: PERIOD,
    requires_cleaning: false,
};

pub struct MultilineTimecard;

impl MultilineTimecard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MultilineTimecard {
    fn default() -> Self {
        Self::new()
    }
}

/// The punches of one day block: the first eligible line with times.
fn block_punches(block: &[&str]) -> Vec<String> {
    for line in block {
        if has_marker(line, &DAY_END) {
            break;
        }
        if has_marker(line, &IGNORED) || PLANNED_SHIFT.is_match(line) {
            continue;
        }

        let times: Vec<String> = TIME_LOOSE
            .find_iter(line)
            .filter_map(|m| normalize_time(m.as_str()))
            .take(2)
            .collect();
        if !times.is_empty() {
            return times;
        }
    }
    Vec::new()
}

impl DocumentModel for MultilineTimecard {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let lowered = text.to_lowercase();
        let mut score = keyword_score(&lowered, &KEYWORDS);
        if ANCHORS.find_iter(text).count() > 5 {
            score += 0.45;
        }
        if PLANNED_SHIFT.is_match(text) {
            score += 0.10;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::tabular("Cartão Ponto", RowsLabel::Registros);
        let bounds = first_captures(&[&*PERIOD_RANGE], text).map(|g| (g[0].clone(), g[1].clone()));
        let range = bounds
            .as_ref()
            .and_then(|(start, end)| PeriodRange::parse(start, end));
        set_header(&mut record, first_capture(&[&*EMPLOYEE], text), bounds);

        let lines = text_lines(text);
        let anchors: Vec<usize> = (0..lines.len())
            .filter(|&i| ANCHOR.is_match(lines[i]))
            .collect();

        for (n, &start) in anchors.iter().enumerate() {
            let end = anchors.get(n + 1).copied().unwrap_or(lines.len());
            let Some(caps) = ANCHOR.captures(lines[start]) else {
                continue;
            };
            let (day_month, weekday) = (&caps[1], &caps[2]);
            let date = range
                .as_ref()
                .and_then(|r| reconstruct_year(day_month, r))
                .unwrap_or_else(|| day_month.to_string());

            let punches = block_punches(&lines[start + 1..end]);
            let rest = &lines[start][caps[0].len()..];
            let day = if punches.is_empty() && has_marker(rest, &DAY_OFF_MARKERS) {
                DayRow::absent(date, weekday, DayStatus::Folga)
            } else {
                DayRow::new(date, weekday).with_punches(punches)
            };
            record.push_row(day.into_fields());
        }

        record
    }
}
