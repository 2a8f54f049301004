//! Brazilian money parsing and formatting.
//!
//! Amounts use `.` as thousands separator and `,` as decimal separator. Payroll
//! systems mark debits either with a leading or a trailing minus (`1.234,56-`).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::patterns::{MONEY_TOKEN, SIGNED_MONEY};
use super::{ExtractionMatch, FieldExtractor};

/// Parse a Brazilian-format amount.
///
/// Unparseable input yields `None`, never an error.
pub fn parse_br_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();

    let (negative, body) = if let Some(rest) = trimmed.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = trimmed.strip_suffix('-') {
        (true, rest)
    } else {
        (false, trimmed)
    };

    if body.is_empty() || body.starts_with('-') || body.ends_with('-') {
        return None;
    }

    let normalized = body.replace('.', "").replace(',', ".");
    let value = Decimal::from_str(&normalized).ok()?;

    Some(if negative { -value } else { value })
}

/// Parse an optional raw amount.
pub fn parse_br_amount_opt(raw: Option<&str>) -> Option<Decimal> {
    raw.and_then(parse_br_amount)
}

/// Format an amount with two decimals, `.` thousands and `,` decimal separator.
pub fn format_br_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let plain = format!("{:.2}", rounded.abs());
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{}{},{}", sign, grouped, fraction)
}

/// Check whether a whitespace token is a well-formed unsigned money value.
pub fn is_money_token(token: &str) -> bool {
    MONEY_TOKEN.is_match(token)
}

/// Whitespace tokens of a line that are money values, in order.
pub fn find_money_tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().filter(|t| is_money_token(t)).collect()
}

/// A signed monetary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MoneyValue(pub Decimal);

impl MoneyValue {
    pub fn parse(raw: &str) -> Option<Self> {
        parse_br_amount(raw).map(MoneyValue)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Magnitude, used when comparing repeated readings of one field.
    pub fn magnitude(&self) -> Decimal {
        self.0.abs()
    }
}

impl fmt::Display for MoneyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_br_amount(self.0))
    }
}

/// Money field extractor.
pub struct MoneyExtractor;

impl MoneyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MoneyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MoneyExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        SIGNED_MONEY
            .find_iter(text)
            .filter_map(|m| {
                parse_br_amount(m.as_str()).map(|amount| {
                    ExtractionMatch::new(amount, 0.8, m.as_str()).with_position(m.start(), m.end())
                })
            })
            .collect()
    }
}
