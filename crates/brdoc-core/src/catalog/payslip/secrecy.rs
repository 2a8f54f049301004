//! Three-column payslip printed under a "Documento em sigilo" watermark.
//!
//! Columns are REMUNERAÇÕES, DESCONTOS and BASES. Text extraction glues the
//! entries together (`391,30401 INSS`), so each data line is split at every
//! amount immediately followed by a three-digit code. The rightmost entry of
//! a multi-entry line is the BASES column and is dropped.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::{first_month_year, Verba, CATEGORY, ICON, PERIOD, PERIOD_FIELD};
use crate::catalog::region::TableRegion;
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::dates::month_year_key;
use crate::rules::money::is_money_token;
use crate::rules::{clamp_score, keyword_score};

lazy_static! {
    static ref GLUED_ENTRY: Regex = Regex::new(r"(\d{1,3}(?:\.\d{3})*,\d{2})(\d{3}\s)").unwrap();
    static ref GLUED_SIGNATURE: Regex = Regex::new(r"\d,\d{2}\d{3}\s").unwrap();
    static ref DATA_LINE: Regex = Regex::new(r"^\d{3}\s").unwrap();
    static ref CODE: Regex = Regex::new(r"^\d{3}$").unwrap();
    static ref QUANTITY: Regex = Regex::new(r"^\d+\.\d{2}$").unwrap();
    static ref MONTH_NAME_YEAR: Regex = Regex::new(
        r"(?i)(janeiro|fevereiro|março|marco|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)/(\d{4})"
    ).unwrap();
    static ref TOTAL_BRUTO: Regex = Regex::new(r"(?i)TOTAL BRUTO[:\s]+([0-9.,]+)").unwrap();
    static ref TOTAL_DESCONTOS: Regex = Regex::new(r"(?i)TOTAL DE DESCONTOS[:\s]+([0-9.,]+)").unwrap();
}

const ENTRY_SEPARATOR: &str = "|||";

const KEYWORDS: [(&str, f32); 4] = [
    ("total bruto", 0.20),
    ("total de descontos", 0.15),
    ("bases", 0.10),
    ("documento em sigilo", 0.20),
];

const BASE_KEYWORDS: [&str; 12] = [
    "BASE ",
    "LIMITE",
    "F.G.T.S",
    "FGTS",
    "% INSS",
    "DED INSS",
    "LIQUIDO A RECEBER",
    "BASE SALARIO",
    "LIQ VALORES",
    "PTE EMPRESA",
    "PTE.EMPRESA",
    "RECOLHER",
];

const DEBIT_KEYWORDS: [&str; 18] = [
    "INSS",
    "I.R.",
    "IR ",
    "IRRF",
    "IMPOSTO",
    "DESCONTO",
    "DESC ",
    "VALE-REFEICAO",
    "VALE REFEICAO",
    "VALE-TRANSPORTE",
    "VALE TRANSPORTE",
    "ADIANTAMENTO",
    "ADTO",
    "SINDICATO",
    "CONTRIBUI",
    "PLANO",
    "CESTA",
    "ARRED.ANTERIOR",
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Contracheque — Sigilo",
    icon: ICON,
    description: "Holerite em três colunas com marca d'água de sigilo",
    category: CATEGORY,
    variant: "Sigilo (três colunas)",
    period: PERIOD,
    requires_cleaning: true,
};

/// Column an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Earning,
    Deduction,
    Base,
}

/// Classify by description first, then by code range.
pub fn classify(code: &str, description: &str) -> EntryKind {
    let code: u32 = code.parse().unwrap_or(0);
    let upper = description.to_uppercase();

    if BASE_KEYWORDS.iter().any(|k| upper.contains(k)) || code >= 700 {
        EntryKind::Base
    } else if DEBIT_KEYWORDS.iter().any(|k| upper.contains(k)) || (400..600).contains(&code) {
        EntryKind::Deduction
    } else {
        EntryKind::Earning
    }
}

/// Split glued entries of one data line.
pub fn split_glued_entries(line: &str) -> Vec<String> {
    let separated = GLUED_ENTRY.replace_all(line, format!("${{1}}{}${{2}}", ENTRY_SEPARATOR));
    separated
        .split(ENTRY_SEPARATOR)
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(String::from)
        .collect()
}

/// A parsed entry: code, description, optional quantity and amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecrecyEntry {
    pub code: String,
    pub description: String,
    pub quantity: Option<String>,
    pub amount: String,
}

pub fn parse_entry(entry: &str) -> Option<SecrecyEntry> {
    let tokens: Vec<&str> = entry.split_whitespace().collect();
    if tokens.len() < 3 || !CODE.is_match(tokens[0]) {
        return None;
    }

    let amount = tokens.iter().rev().find(|t| is_money_token(t))?;
    let first_value = tokens.iter().position(|t| is_money_token(t))?;
    let quantity = tokens
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, t)| QUANTITY.is_match(t));

    let description_end = quantity.map(|(i, _)| i).unwrap_or(first_value);
    Some(SecrecyEntry {
        code: tokens[0].to_string(),
        description: tokens[1..description_end.max(1)].join(" "),
        quantity: quantity.map(|(_, q)| q.to_string()),
        amount: amount.to_string(),
    })
}

fn period(lines: &[&str]) -> Option<String> {
    lines.iter().find_map(|line| {
        MONTH_NAME_YEAR
            .captures(line)
            .and_then(|caps| month_year_key(&caps[1], &caps[2]))
            .or_else(|| first_month_year(line))
    })
}

fn into_verba(entry: SecrecyEntry) -> Option<Verba> {
    let kind = classify(&entry.code, &entry.description);
    let quantidade = entry.quantity.filter(|q| q != "0.00");
    let verba = Verba {
        quantidade,
        ..Verba::new(entry.code, entry.description)
    };

    match kind {
        EntryKind::Base => None,
        EntryKind::Deduction => Some(Verba {
            desconto: Some(entry.amount),
            ..verba
        }),
        EntryKind::Earning => Some(Verba {
            vencimento: Some(entry.amount),
            ..verba
        }),
    }
}

pub struct SecrecyPayslip;

impl SecrecyPayslip {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SecrecyPayslip {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel for SecrecyPayslip {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let lowered = text.to_lowercase();
        let mut score = keyword_score(&lowered, &KEYWORDS);
        if lowered.contains("r e m u n e r a") {
            score += 0.35;
        } else if lowered.contains("remunerações") {
            score += 0.25;
        }
        if GLUED_SIGNATURE.is_match(text) {
            score += 0.15;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let lines = text_lines(text);
        let mut record = ExtractionRecord::tabular("Contracheque (Sigilo)", RowsLabel::Verbas);
        record.set_opt(PERIOD_FIELD, period(&lines));

        if let Some(totals) = lines.iter().find(|l| l.to_uppercase().contains("TOTAL BRUTO")) {
            record.set_opt(
                "total_bruto",
                TOTAL_BRUTO.captures(totals).map(|caps| caps[1].to_string()),
            );
            record.set_opt(
                "total_descontos",
                TOTAL_DESCONTOS.captures(totals).map(|caps| caps[1].to_string()),
            );
        }

        let rows = TableRegion::rows(
            &lines,
            |l| l.contains("R E M U N E R A") || l.to_uppercase().contains("REMUNERAÇ"),
            |l| l.to_uppercase().contains("TOTAL BRUTO"),
        );

        for line in rows.into_iter().filter(|l| DATA_LINE.is_match(l)) {
            let mut entries = split_glued_entries(line);
            if entries.len() > 1 {
                entries.pop();
            }

            for entry in entries {
                match parse_entry(&entry).and_then(into_verba) {
                    Some(verba) => record.push_row(verba.into_fields()),
                    None => debug!("Skipping secrecy entry: {}", entry),
                }
            }
        }

        record
    }
}
