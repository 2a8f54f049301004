//! Date helpers for Brazilian documents: month names, full dates and year
//! reconstruction for `DD/MM` rows.

use chrono::{Datelike, NaiveDate};

use super::patterns::FULL_DATE;
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor for `DD/MM/YYYY` and `DD.MM.YYYY`.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in FULL_DATE.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let year = parse_year(&caps[3]);

            if let (Some(date), Some(full_match)) =
                (NaiveDate::from_ymd_opt(year, month, day), caps.get(0))
            {
                results.push(
                    ExtractionMatch::new(date, 0.9, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Parse a `DD/MM/YYYY` (or dotted) date.
pub fn parse_br_date(raw: &str) -> Option<NaiveDate> {
    DateExtractor::new().extract(raw.trim()).map(|m| m.value)
}

/// Format a date as `DD/MM/YYYY`.
pub fn format_br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Month number for a Portuguese month name or three-letter abbreviation.
///
/// Matching ignores case and accents (`Março`, `MARCO`, `mar`).
pub fn month_number(name: &str) -> Option<u32> {
    let folded = fold_accents(&name.trim().to_lowercase());

    let month = match folded.as_str() {
        "jan" | "janeiro" => 1,
        "fev" | "fevereiro" => 2,
        "mar" | "marco" => 3,
        "abr" | "abril" => 4,
        "mai" | "maio" => 5,
        "jun" | "junho" => 6,
        "jul" | "julho" => 7,
        "ago" | "agosto" => 8,
        "set" | "setembro" => 9,
        "out" | "outubro" => 10,
        "nov" | "novembro" => 11,
        "dez" | "dezembro" => 12,
        _ => return None,
    };

    Some(month)
}

/// Normalize a month name or number plus year into `MM/YYYY`.
pub fn month_year_key(month: &str, year: &str) -> Option<String> {
    let month = match month.trim().parse::<u32>() {
        Ok(n) if (1..=12).contains(&n) => n,
        Ok(_) => return None,
        Err(_) => month_number(month)?,
    };
    let year = year.trim();
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(format!("{:02}/{}", month, year))
}

/// The period a timecard covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both ends from `DD/MM/YYYY` strings.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        Some(Self::new(parse_br_date(start)?, parse_br_date(end)?))
    }

    /// Year a `DD/MM` row belongs to.
    ///
    /// A row matching the start month takes the start year, one matching the
    /// end month takes the end year. December rows in a period ending in
    /// January belong to the start year, January rows in a period starting in
    /// December to the end year. Anything else takes the end year.
    pub fn year_for_month(&self, month: u32) -> i32 {
        let start_month = self.start.month();
        let end_month = self.end.month();

        if month == start_month {
            self.start.year()
        } else if month == end_month {
            self.end.year()
        } else if month == 12 && end_month == 1 {
            self.start.year()
        } else if month == 1 && start_month == 12 {
            self.end.year()
        } else {
            self.end.year()
        }
    }
}

/// Attach the period year to a `DD/MM` row date, producing `DD/MM/YYYY`.
pub fn reconstruct_year(day_month: &str, period: &PeriodRange) -> Option<String> {
    let (day, month) = day_month.trim().split_once('/')?;
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }

    Some(format!("{:02}/{:02}/{}", day, month, period.year_for_month(month)))
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

/// Strip the Portuguese diacritics that show up in month and weekday names.
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            'Á' | 'À' | 'Â' | 'Ã' => 'A',
            'É' | 'Ê' => 'E',
            'Í' => 'I',
            'Ó' | 'Ô' | 'Õ' => 'O',
            'Ú' | 'Ü' => 'U',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}
