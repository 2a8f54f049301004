//! Payslip (contracheque) layouts.
//!
//! Every layout produces a tabular record whose rows (`verbas`) carry a code, a
//! description and some of `referencia`, `quantidade`, `vencimento`, `desconto`
//! and `valor`. The record is keyed by its `mes_ano` period.

pub mod competence;
pub mod four_digit;
pub mod org_unit;
pub mod pipe;
pub mod secrecy;
pub mod standard;
pub mod textual_month;
pub mod two_column;

pub use competence::CompetencePayslip;
pub use four_digit::FourDigitPayslip;
pub use org_unit::OrgUnitPayslip;
pub use pipe::PipePayslip;
pub use secrecy::SecrecyPayslip;
pub use standard::StandardPayslip;
pub use textual_month::TextualMonthPayslip;
pub use two_column::TwoColumnPayslip;

use regex::Regex;

use super::PeriodPolicy;
use crate::models::record::Fields;
use crate::rules::money::is_money_token;
use crate::rules::patterns::MONTH_YEAR;

pub const CATEGORY: &str = "Contracheque";
pub const ICON: &str = "money-check";
pub const PERIOD: PeriodPolicy = PeriodPolicy::DocumentField(PERIOD_FIELD);
pub const PERIOD_FIELD: &str = "mes_ano";

/// Description fragments that mark a line item as a deduction.
pub const DEBIT_KEYWORDS: [&str; 16] = [
    "INSS",
    "IRRF",
    "IMPOSTO",
    "DESCONTO",
    "ADTO",
    "ADIANTAMENTO",
    "VALE",
    "CESTA",
    "PLANO",
    "CONTRIBUI",
    "SINDICATO",
    "TRANSPORTE",
    "ASSOCIA",
    "REFEIÇÃO",
    "ASEHUP",
    "ARREDONDAMENTO",
];

/// Upper-case substring match against the debit keywords.
pub fn is_debit(description: &str) -> bool {
    let upper = description.to_uppercase();
    DEBIT_KEYWORDS.iter().any(|k| upper.contains(k))
}

/// One payslip line item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verba {
    pub codigo: String,
    pub descricao: String,
    pub referencia: Option<String>,
    pub quantidade: Option<String>,
    pub vencimento: Option<String>,
    pub desconto: Option<String>,
    pub valor: Option<String>,
}

impl Verba {
    pub fn new(codigo: impl Into<String>, descricao: impl Into<String>) -> Self {
        Self {
            codigo: codigo.into(),
            descricao: descricao.into(),
            ..Self::default()
        }
    }

    /// Assign `amount` to `desconto` or `vencimento` by the description.
    pub fn with_classified_amount(mut self, amount: String) -> Self {
        if is_debit(&self.descricao) {
            self.desconto = Some(amount);
        } else {
            self.vencimento = Some(amount);
        }
        self
    }

    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("codigo".to_string(), self.codigo);
        fields.insert("descricao".to_string(), self.descricao);

        let optional = [
            ("referencia", self.referencia),
            ("quantidade", self.quantidade),
            ("vencimento", self.vencimento),
            ("desconto", self.desconto),
            ("valor", self.valor),
        ];
        for (key, value) in optional {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                fields.insert(key.to_string(), value);
            }
        }
        fields
    }
}

/// A line split into code, description and money tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedLine {
    pub code: String,
    pub description: String,
    pub values: Vec<String>,
}

/// Split a whitespace-delimited row.
///
/// The row needs at least three tokens, a first token matching `code` and at
/// least one money token. The description is every token between the code and
/// the first money token.
pub fn parse_coded_line(line: &str, code: &Regex) -> Option<CodedLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 || !code.is_match(tokens[0]) {
        return None;
    }

    let first_value = tokens.iter().position(|t| is_money_token(t))?;
    if first_value == 0 {
        return None;
    }
    let values = tokens
        .iter()
        .filter(|t| is_money_token(t))
        .map(|t| t.to_string())
        .collect();

    Some(CodedLine {
        code: tokens[0].to_string(),
        description: tokens[1..first_value].join(" "),
        values,
    })
}

/// Reference-and-amount classification shared by the space-delimited layouts:
/// one value is the amount, two or more are reference then amount.
pub fn reference_then_amount(line: CodedLine) -> Verba {
    let verba = Verba::new(line.code, line.description);
    let mut values = line.values.into_iter();
    match (values.next(), values.next()) {
        (Some(amount), None) => verba.with_classified_amount(amount),
        (Some(reference), Some(amount)) => Verba {
            referencia: Some(reference),
            ..verba
        }
        .with_classified_amount(amount),
        _ => verba,
    }
}

/// First `MM/YYYY` in the text.
pub fn first_month_year(text: &str) -> Option<String> {
    MONTH_YEAR
        .captures(text)
        .map(|caps| format!("{}/{}", &caps[1], &caps[2]))
}

/// Number of `|` characters, the structural signature of the pipe layout.
pub(crate) fn pipe_count(text: &str) -> usize {
    text.matches('|').count()
}
