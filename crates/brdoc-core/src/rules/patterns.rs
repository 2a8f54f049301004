//! Common regex patterns for Brazilian document extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Brazilian money (1.234,56)
    pub static ref MONEY_TOKEN: Regex = Regex::new(
        r"^\d{1,3}(?:\.\d{3})*,\d{2}$"
    ).unwrap();

    pub static ref MONEY_ANYWHERE: Regex = Regex::new(
        r"\d{1,3}(?:\.\d{3})*,\d{2}"
    ).unwrap();

    pub static ref SIGNED_MONEY: Regex = Regex::new(
        r"-?\d{1,3}(?:\.\d{3})*,\d{2}-?"
    ).unwrap();

    pub static ref LOOSE_NUMBER: Regex = Regex::new(
        r"^[\d.,]+$"
    ).unwrap();

    // Period and date patterns
    pub static ref MONTH_YEAR: Regex = Regex::new(
        r"\b(0[1-9]|1[0-2])/((?:19|20)\d{2})\b"
    ).unwrap();

    pub static ref MONTH_YEAR_BOUNDED: Regex = Regex::new(
        r"\b\d{2}/\d{4}\b"
    ).unwrap();

    pub static ref MONTH_ABBREV_YEAR: Regex = Regex::new(
        r"(JAN|FEV|MAR|ABR|MAI|JUN|JUL|AGO|SET|OUT|NOV|DEZ)/(\d{4})"
    ).unwrap();

    pub static ref MONTH_ABBREV_YEAR_BOUNDED: Regex = Regex::new(
        r"\b(?:JAN|FEV|MAR|ABR|MAI|JUN|JUL|AGO|SET|OUT|NOV|DEZ)/\d{4}\b"
    ).unwrap();

    pub static ref FULL_DATE: Regex = Regex::new(
        r"\b(\d{2})[/.](\d{2})[/.](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_SLASHED: Regex = Regex::new(
        r"(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    // Punches
    pub static ref TIME_HHMM: Regex = Regex::new(
        r"\b(\d{2}:\d{2})\b"
    ).unwrap();

    pub static ref TIME_LOOSE: Regex = Regex::new(
        r"\b(\d{1,2}:\d{2})\b"
    ).unwrap();

    pub static ref TIME_WITH_SECONDS: Regex = Regex::new(
        r"\b(\d{2}:\d{2}:\d{2})\b"
    ).unwrap();

    pub static ref PLANNED_SHIFT: Regex = Regex::new(
        r"\d{1,2}:\d{2}\s*-\s*\d{1,2}:\d{2}"
    ).unwrap();

    // Tax identifiers
    pub static ref CPF: Regex = Regex::new(
        r"\d{3}\.\d{3}\.\d{3}-\d{2}"
    ).unwrap();

    pub static ref CNPJ: Regex = Regex::new(
        r"\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}"
    ).unwrap();

    // Bank slip typeable line
    pub static ref LINHA_DIGITAVEL: Regex = Regex::new(
        r"\d{5}\.\d{5}\s+\d{5}\.\d{6}\s+\d{5}\.\d{6}\s+\d\s+\d{14}"
    ).unwrap();

    // Amounts after a currency sign
    pub static ref REAIS_AMOUNT: Regex = Regex::new(
        r"R\$\s*(\d(?:[\d.,]*\d)?)"
    ).unwrap();

    // Generic entities
    pub static ref ENTITY_DATE: Regex = Regex::new(
        r"\d{1,2}/\d{1,2}/\d{2,4}"
    ).unwrap();

    pub static ref ENTITY_MONEY: Regex = Regex::new(
        r"R\$\s?[\d.,]+"
    ).unwrap();

    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    pub static ref PHONE: Regex = Regex::new(
        r"\(?\d{2}\)?\s?\d{4,5}-?\d{4}"
    ).unwrap();

    pub static ref CEP: Regex = Regex::new(
        r"\d{5}-\d{3}"
    ).unwrap();

    pub static ref RG: Regex = Regex::new(
        r"\d{1,2}\.\d{3}\.\d{3}-[\dXx]"
    ).unwrap();

    pub static ref PIS_PASEP: Regex = Regex::new(
        r"\d{3}\.\d{5}\.\d{2}-\d"
    ).unwrap();

    pub static ref CHAVE_NFE: Regex = Regex::new(
        r"\d{44}"
    ).unwrap();

    pub static ref ENTITY_TIME: Regex = Regex::new(
        r"\b\d{2}:\d{2}\b"
    ).unwrap();

    pub static ref PERCENTAGE: Regex = Regex::new(
        r"\d+[,.]?\d*\s?%"
    ).unwrap();

    pub static ref LICENSE_PLATE: Regex = Regex::new(
        r"[A-Z]{3}-?\d[A-Z0-9]\d{2}"
    ).unwrap();

    pub static ref STATE_REGISTRATION: Regex = Regex::new(
        r"(?:IE|Insc\.?\s*Est\.?)[:\s]*[\d./\-]+"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_token_boundaries() {
        assert!(MONEY_TOKEN.is_match("1.234,56"));
        assert!(MONEY_TOKEN.is_match("0,50"));
        assert!(!MONEY_TOKEN.is_match("1234,56"));
        assert!(!MONEY_TOKEN.is_match("1.234,5"));
        assert!(!MONEY_TOKEN.is_match("1.234,56-"));
    }

    #[test]
    fn test_month_year_skips_tax_ids() {
        let caps = MONTH_YEAR.captures("CNPJ 12.345.678/0001-90 Ref 03/2024").unwrap();
        assert_eq!(&caps[1], "03");
        assert_eq!(&caps[2], "2024");
    }

    #[test]
    fn test_linha_digitavel() {
        let line = "23790.12345 60000.123456 78901.234567 8 95610000012500";
        assert!(LINHA_DIGITAVEL.is_match(line));
    }

    #[test]
    fn test_reais_amount_drops_trailing_punctuation() {
        let caps = REAIS_AMOUNT.captures("valor de R$ 2.400,00.").unwrap();
        assert_eq!(&caps[1], "2.400,00");
    }

    #[test]
    fn test_tax_ids() {
        assert!(CPF.is_match("CPF 123.456.789-09"));
        assert!(CNPJ.is_match("CNPJ 12.345.678/0001-90"));
        assert!(!CNPJ.is_match("123.456.789-09"));
    }
}
