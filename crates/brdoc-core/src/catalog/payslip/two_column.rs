//! Two-in-one payslip ("Folha Mensal"): earnings and deductions are printed
//! side by side, so one text line carries two or more entries.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::{first_month_year, pipe_count, Verba, CATEGORY, ICON, PERIOD, PERIOD_FIELD};
use crate::catalog::region::TableRegion;
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::{clamp_score, keyword_score};

lazy_static! {
    static ref TITLE: Regex = Regex::new(r"Folha Mensal de (\d{2}/\d{4})").unwrap();
    static ref CODE: Regex = Regex::new(r"^\d{1,5}$").unwrap();
    static ref VALUE: Regex = Regex::new(r"^\d{1,3}(?:\.\d{3})*,\d{2}-?$").unwrap();
}

const KEYWORDS: [(&str, f32); 4] = [
    ("demonstrativo de pagamento", 0.15),
    ("total venctos", 0.15),
    ("l í q u i d o", 0.15),
    ("cód.", 0.05),
];

const TERMINALS: [&str; 4] = ["Salário p/Mês", "SALÁRIO BASE", "Total Venctos", "L í q u i d o"];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Contracheque — Duas Colunas",
    icon: ICON,
    description: "Folha mensal com proventos e descontos lado a lado na mesma linha",
    category: CATEGORY,
    variant: "Duas colunas",
    period: PERIOD,
    requires_cleaning: false,
};

pub struct TwoColumnPayslip;

impl TwoColumnPayslip {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TwoColumnPayslip {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a line into entries. An entry starts at a short numeric code that is
/// followed by a non-value token.
pub fn split_entries(line: &str) -> Vec<Verba> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let starts: Vec<usize> = (0..tokens.len())
        .filter(|&i| {
            CODE.is_match(tokens[i])
                && tokens.get(i + 1).is_some_and(|next| !VALUE.is_match(next))
        })
        .collect();

    let mut entries = Vec::new();
    for (n, &start) in starts.iter().enumerate() {
        let end = starts.get(n + 1).copied().unwrap_or(tokens.len());
        if let Some(verba) = parse_segment(&tokens[start..end]) {
            entries.push(verba);
        }
    }
    entries
}

fn parse_segment(segment: &[&str]) -> Option<Verba> {
    let (code, rest) = segment.split_first()?;
    let trailing = rest.iter().rev().take_while(|t| VALUE.is_match(t)).count();
    if trailing == 0 || trailing == rest.len() {
        return None;
    }

    let description = rest[..rest.len() - trailing].join(" ");
    let values = &rest[rest.len() - trailing..];
    let valor = values.last().map(|v| v.to_string());
    let referencia = if values.len() > 1 {
        Some(values[0].to_string())
    } else {
        None
    };

    Some(Verba {
        referencia,
        valor,
        ..Verba::new(*code, description)
    })
}

impl DocumentModel for TwoColumnPayslip {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let mut score = keyword_score(&text.to_lowercase(), &KEYWORDS);
        if TITLE.is_match(text) {
            score += 0.45;
        }
        if pipe_count(text) > 5 {
            score -= 0.20;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let lines = text_lines(text);
        let mut record = ExtractionRecord::tabular("Contracheque", RowsLabel::Verbas);

        let period = TITLE
            .captures(text)
            .map(|caps| caps[1].to_string())
            .or_else(|| first_month_year(text));
        record.set_opt(PERIOD_FIELD, period);

        let rows = TableRegion::rows(
            &lines,
            |l| {
                (l.contains("CÓD.") && l.contains("DESCRIÇÃO"))
                    || (l.contains("Cód") && l.contains("Descrição"))
            },
            |l| TERMINALS.iter().any(|t| l.contains(t)),
        );

        for line in rows {
            let entries = split_entries(line);
            if entries.is_empty() {
                debug!("No entries on two-column line: {}", line);
            }
            for verba in entries {
                record.push_row(verba.into_fields());
            }
        }

        record
    }
}
