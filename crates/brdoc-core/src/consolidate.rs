//! Multi-page consolidation keyed by period.
//!
//! Every page of a document yields one or more [`PeriodEntry`] values. Entries
//! sharing a period key are merged field by field into a
//! [`ConsolidatedDataset`]: amount-bearing fields keep the value with the
//! largest magnitude, every other field takes the later page's value.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::PeriodPolicy;
use crate::models::record::{ExtractionRecord, Fields, Table, DOCUMENT_TYPE_FIELD};
use crate::rules::money::parse_br_amount;

/// Name of the period column in consolidated tables.
pub const PERIOD_COLUMN: &str = "periodo";

/// Key suffixes of fields merged by magnitude.
const VALUE_TAGS: [&str; 7] = [
    "[VALOR]",
    "[VENCIMENTO]",
    "[VENCIMENTOS]",
    "[DESCONTO]",
    "[DESCONTOS]",
    "[REFERENCIA]",
    "[QUANTIDADE]",
];

/// Row fields flattened into tagged payslip keys, with their tag.
const ROW_TAGS: [(&str, &str); 5] = [
    ("referencia", "REFERENCIA"),
    ("quantidade", "QUANTIDADE"),
    ("vencimento", "VENCIMENTO"),
    ("desconto", "DESCONTO"),
    ("valor", "VALOR"),
];

/// Fields of one page under one period key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodEntry {
    /// `MM/YYYY`, `DD/MM/YYYY` or `página N`. Entries without a key are skipped.
    pub key: Option<String>,
    pub fields: Fields,
}

impl PeriodEntry {
    pub fn new(key: Option<String>, fields: Fields) -> Self {
        Self { key, fields }
    }
}

/// True for field names merged by magnitude.
pub fn is_value_tagged(key: &str) -> bool {
    VALUE_TAGS.iter().any(|tag| key.ends_with(tag))
}

/// Document-level fields minus the type label and the key field.
fn header_fields(record: &ExtractionRecord, key_field: Option<&str>) -> Fields {
    record
        .fields()
        .iter()
        .filter(|(k, _)| k.as_str() != DOCUMENT_TYPE_FIELD && Some(k.as_str()) != key_field)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Payslip rows as `"{codigo} - {descricao} [TAG]"` keys.
fn flatten_line_items(rows: &[Fields], into: &mut Fields) {
    for row in rows {
        let description = row.get("descricao").map(String::as_str).unwrap_or_default();
        let label = match row.get("codigo") {
            Some(code) if !code.is_empty() => format!("{} - {}", code, description),
            _ if !description.is_empty() => description.to_string(),
            _ => continue,
        };

        for (field, tag) in ROW_TAGS {
            if let Some(value) = row.get(field) {
                let key = format!("{} [{}]", label, tag);
                let mut incoming = Fields::new();
                incoming.insert(key, value.clone());
                merge_fields(into, incoming);
            }
        }
    }
}

/// Flatten the record of page `page` (1-based) under a period policy.
pub fn period_entries(
    policy: PeriodPolicy,
    record: &ExtractionRecord,
    page: usize,
) -> Vec<PeriodEntry> {
    match policy {
        PeriodPolicy::DocumentField(field) => {
            let mut fields = header_fields(record, Some(field));
            flatten_line_items(record.rows(), &mut fields);
            vec![PeriodEntry::new(
                record.get(field).map(str::to_string),
                fields,
            )]
        }
        PeriodPolicy::PerRow(field) => {
            let header = header_fields(record, None);
            record
                .rows()
                .iter()
                .map(|row| {
                    let mut fields = header.clone();
                    for (k, v) in row.iter().filter(|(k, _)| k.as_str() != field) {
                        fields.insert(k.clone(), v.clone());
                    }
                    PeriodEntry::new(row.get(field).cloned(), fields)
                })
                .collect()
        }
        PeriodPolicy::PerPage => {
            if record.rows().is_empty() {
                return vec![PeriodEntry::new(
                    Some(format!("página {}", page)),
                    header_fields(record, None),
                )];
            }
            record
                .rows()
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    PeriodEntry::new(Some(format!("página {} linha {}", page, i + 1)), row.clone())
                })
                .collect()
        }
    }
}

/// Merge `incoming` into `target`.
///
/// Value-tagged fields keep the larger absolute amount; an unparseable old value
/// gives way to a parseable new one, and ties or two unparseable values keep
/// the existing value. Other fields are overwritten.
pub fn merge_fields(target: &mut Fields, incoming: Fields) {
    for (key, value) in incoming {
        let Some(existing) = target.get(&key) else {
            target.insert(key, value);
            continue;
        };

        if !is_value_tagged(&key) {
            target.insert(key, value);
            continue;
        }

        let replace = match (parse_br_amount(existing), parse_br_amount(&value)) {
            (Some(old), Some(new)) => new.abs() > old.abs(),
            (None, Some(_)) => true,
            (_, None) => false,
        };
        if replace {
            debug!("Keeping larger value for {}: {}", key, value);
            target.insert(key, value);
        }
    }
}

/// Ordered mapping from period key to merged fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsolidatedDataset {
    periods: IndexMap<String, Fields>,
}

impl ConsolidatedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce entries in page order.
    pub fn consolidate(entries: impl IntoIterator<Item = PeriodEntry>) -> Self {
        let mut dataset = Self::new();
        for entry in entries {
            dataset.push(entry);
        }
        dataset
    }

    /// Merge one entry. Returns false when the entry had no period key.
    pub fn push(&mut self, entry: PeriodEntry) -> bool {
        let Some(key) = entry.key else {
            warn!("Skipping entry without a period key ({} fields)", entry.fields.len());
            return false;
        };

        match self.periods.get_mut(&key) {
            Some(fields) => merge_fields(fields, entry.fields),
            None => {
                debug!("New period {}", key);
                self.periods.insert(key, entry.fields);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Fields> {
        self.periods.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.periods.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fields)> {
        self.periods.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// One row per period, the period column first, then every field in
    /// first-seen order.
    pub fn to_table(&self) -> Table {
        if self.periods.is_empty() {
            return Table::empty();
        }

        let maps: Vec<Fields> = self
            .periods
            .iter()
            .map(|(key, fields)| {
                let mut row = Fields::new();
                row.insert(PERIOD_COLUMN.to_string(), key.clone());
                row.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                row
            })
            .collect();
        Table::from_field_maps(&maps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::RowsLabel;
    use pretty_assertions::assert_eq;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn entry(key: &str, pairs: &[(&str, &str)]) -> PeriodEntry {
        PeriodEntry::new(Some(key.to_string()), fields(pairs))
    }

    #[test]
    fn test_value_tags() {
        assert!(is_value_tagged("001 - SALARIO [VENCIMENTO]"));
        assert!(is_value_tagged("BONUS [DESCONTOS]"));
        assert!(!is_value_tagged("funcionario"));
        assert!(!is_value_tagged("[VALOR] no início"));
    }

    #[test]
    fn test_larger_magnitude_wins() {
        let dataset = ConsolidatedDataset::consolidate(vec![
            entry("07/2024", &[("001 - INSS [VALOR]", "100,00")]),
            entry("07/2024", &[("001 - INSS [VALOR]", "1.000,00")]),
            entry("07/2024", &[("001 - INSS [VALOR]", "50,00")]),
        ]);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get("07/2024").unwrap()["001 - INSS [VALOR]"], "1.000,00");
    }

    #[test]
    fn test_larger_amount_wins_in_either_page_order() {
        let small = || entry("07/2024", &[("001 - INSS [VALOR]", "234,56")]);
        let large = || entry("07/2024", &[("001 - INSS [VALOR]", "1.234,56")]);

        for entries in [vec![small(), large()], vec![large(), small()]] {
            let dataset = ConsolidatedDataset::consolidate(entries);
            assert_eq!(dataset.len(), 1);
            assert_eq!(dataset.get("07/2024").unwrap()["001 - INSS [VALOR]"], "1.234,56");
        }
    }

    #[test]
    fn test_negative_magnitude_and_ties() {
        let mut target = fields(&[("X [DESCONTO]", "200,00"), ("Y [VALOR]", "10,00")]);
        merge_fields(
            &mut target,
            fields(&[("X [DESCONTO]", "-300,00"), ("Y [VALOR]", "10,00-")]),
        );
        assert_eq!(target["X [DESCONTO]"], "-300,00");
        assert_eq!(target["Y [VALOR]"], "10,00");
    }

    #[test]
    fn test_unparseable_values() {
        let mut target = fields(&[("A [VALOR]", "abc"), ("B [VALOR]", "xyz")]);
        merge_fields(&mut target, fields(&[("A [VALOR]", "5,00"), ("B [VALOR]", "???")]));
        assert_eq!(target["A [VALOR]"], "5,00");
        assert_eq!(target["B [VALOR]"], "xyz");

        let mut target = fields(&[("C [VALOR]", "7,00")]);
        merge_fields(&mut target, fields(&[("C [VALOR]", "n/d")]));
        assert_eq!(target["C [VALOR]"], "7,00");
    }

    #[test]
    fn test_plain_fields_take_later_page() {
        let dataset = ConsolidatedDataset::consolidate(vec![
            entry("03/2024", &[("cnpj", "A")]),
            entry("03/2024", &[("cnpj", "B"), ("novo", "1")]),
        ]);
        assert_eq!(dataset.get("03/2024").unwrap(), &fields(&[("cnpj", "B"), ("novo", "1")]));
    }

    #[test]
    fn test_missing_key_is_skipped() {
        let mut dataset = ConsolidatedDataset::new();
        assert!(!dataset.push(PeriodEntry::new(None, fields(&[("a", "1")]))));
        assert!(dataset.is_empty());
        assert!(dataset.to_table().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let entries = vec![
            entry("01/2024", &[("001 - SALARIO [VENCIMENTO]", "3.000,00"), ("cnpj", "X")]),
            entry("02/2024", &[("001 - SALARIO [VENCIMENTO]", "3.100,00")]),
            entry("01/2024", &[("001 - SALARIO [VENCIMENTO]", "2.000,00"), ("cnpj", "Y")]),
        ];
        let once = ConsolidatedDataset::consolidate(entries.clone());
        let twice = ConsolidatedDataset::consolidate(entries.iter().chain(entries.iter()).cloned());
        assert_eq!(once, twice);
        assert_eq!(once.keys().collect::<Vec<_>>(), vec!["01/2024", "02/2024"]);
    }

    #[test]
    fn test_table_period_column_first() {
        let dataset = ConsolidatedDataset::consolidate(vec![
            entry("01/2024", &[("a", "1")]),
            entry("02/2024", &[("b", "2")]),
        ]);
        let table = dataset.to_table();
        assert_eq!(table.columns, vec!["periodo", "a", "b"]);
        assert_eq!(table.rows[1], vec!["02/2024", "", "2"]);
    }

    #[test]
    fn test_payslip_rows_flatten_to_tagged_keys() {
        let mut record = ExtractionRecord::tabular("Contracheque", RowsLabel::Verbas);
        record.set("mes_ano", "07/2024");
        record.push_row(fields(&[
            ("codigo", "001"),
            ("descricao", "SALARIO"),
            ("referencia", "30,00"),
            ("vencimento", "3.000,00"),
        ]));
        record.push_row(fields(&[("codigo", "500"), ("descricao", "INSS"), ("desconto", "330,00")]));

        let entries = period_entries(PeriodPolicy::DocumentField("mes_ano"), &record, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key.as_deref(), Some("07/2024"));
        assert_eq!(
            entries[0].fields,
            fields(&[
                ("001 - SALARIO [REFERENCIA]", "30,00"),
                ("001 - SALARIO [VENCIMENTO]", "3.000,00"),
                ("500 - INSS [DESCONTO]", "330,00"),
            ])
        );
    }

    #[test]
    fn test_per_row_entries() {
        let mut record = ExtractionRecord::tabular("Cartão Ponto", RowsLabel::Registros);
        record.set("funcionario", "ANA");
        record.push_row(fields(&[("data", "01/03/2024"), ("entrada1", "08:00")]));
        record.push_row(fields(&[("entrada1", "09:00")]));

        let entries = period_entries(PeriodPolicy::PerRow("data"), &record, 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key.as_deref(), Some("01/03/2024"));
        assert_eq!(
            entries[0].fields,
            fields(&[("funcionario", "ANA"), ("entrada1", "08:00")])
        );
        assert_eq!(entries[1].key, None);
    }

    #[test]
    fn test_per_page_entries() {
        let mut record = ExtractionRecord::scalar("Boleto Bancário");
        record.set("valor", "10,00");
        let entries = period_entries(PeriodPolicy::PerPage, &record, 3);
        assert_eq!(entries, vec![entry("página 3", &[("valor", "10,00")])]);

        let mut statement = ExtractionRecord::tabular("Extrato Bancário", RowsLabel::Lancamentos);
        statement.push_row(fields(&[("data", "01/03"), ("valor", "1,00")]));
        statement.push_row(fields(&[("data", "02/03"), ("valor", "2,00")]));
        let entries = period_entries(PeriodPolicy::PerPage, &statement, 1);
        assert_eq!(entries[1].key.as_deref(), Some("página 1 linha 2"));
    }
}
