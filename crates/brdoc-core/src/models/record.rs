//! Extraction records and their tabular export shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered field map. Absent values are absent keys.
pub type Fields = IndexMap<String, String>;

/// Field carrying the human-readable document type.
pub const DOCUMENT_TYPE_FIELD: &str = "tipo_documento";

/// Name of the list-valued field holding line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowsLabel {
    /// Payslip earnings and deductions.
    Verbas,
    /// Timecard day entries.
    Registros,
    /// Bank statement entries.
    Lancamentos,
}

impl RowsLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowsLabel::Verbas => "verbas",
            RowsLabel::Registros => "registros",
            RowsLabel::Lancamentos => "lancamentos",
        }
    }
}

/// Structured output of a document model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionRecord {
    /// Document-level fields only.
    Scalar { fields: Fields },

    /// Document-level fields plus one field map per detected table row.
    Tabular {
        fields: Fields,
        rows_label: RowsLabel,
        rows: Vec<Fields>,
    },
}

impl ExtractionRecord {
    /// The empty record: no fields, no rows.
    pub fn empty() -> Self {
        ExtractionRecord::Scalar {
            fields: Fields::new(),
        }
    }

    /// Create a scalar record tagged with a document type.
    pub fn scalar(document_type: &str) -> Self {
        let mut fields = Fields::new();
        fields.insert(DOCUMENT_TYPE_FIELD.to_string(), document_type.to_string());
        ExtractionRecord::Scalar { fields }
    }

    /// Create a tabular record tagged with a document type and no rows yet.
    pub fn tabular(document_type: &str, rows_label: RowsLabel) -> Self {
        let mut fields = Fields::new();
        fields.insert(DOCUMENT_TYPE_FIELD.to_string(), document_type.to_string());
        ExtractionRecord::Tabular {
            fields,
            rows_label,
            rows: Vec::new(),
        }
    }

    pub fn fields(&self) -> &Fields {
        match self {
            ExtractionRecord::Scalar { fields } => fields,
            ExtractionRecord::Tabular { fields, .. } => fields,
        }
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        match self {
            ExtractionRecord::Scalar { fields } => fields,
            ExtractionRecord::Tabular { fields, .. } => fields,
        }
    }

    /// Table rows, empty for scalar records.
    pub fn rows(&self) -> &[Fields] {
        match self {
            ExtractionRecord::Scalar { .. } => &[],
            ExtractionRecord::Tabular { rows, .. } => rows,
        }
    }

    pub fn rows_label(&self) -> Option<RowsLabel> {
        match self {
            ExtractionRecord::Scalar { .. } => None,
            ExtractionRecord::Tabular { rows_label, .. } => Some(*rows_label),
        }
    }

    /// Look up a document-level field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields().get(key).map(String::as_str)
    }

    /// Set a document-level field, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields_mut().insert(key.to_string(), value.into());
    }

    /// Set a field only when a value is present.
    pub fn set_opt(&mut self, key: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    /// Append a row. Scalar records ignore rows.
    pub fn push_row(&mut self, row: Fields) {
        if let ExtractionRecord::Tabular { rows, .. } = self {
            rows.push(row);
        }
    }

    pub fn document_type(&self) -> Option<&str> {
        self.get(DOCUMENT_TYPE_FIELD)
    }

    /// True when there are neither fields nor rows.
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty() && self.rows().is_empty()
    }

    /// Default table shape: one table row per record row, otherwise a single row
    /// holding the scalar fields.
    pub fn to_table(&self) -> Table {
        if !self.rows().is_empty() {
            return Table::from_field_maps(self.rows());
        }

        if self.fields().is_empty() {
            return Table::empty();
        }

        Table::from_field_maps(std::slice::from_ref(self.fields()))
    }
}

impl Default for ExtractionRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// Ordered column names and string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table whose columns are the union of the maps' keys in first-seen
    /// order. Missing cells are empty strings.
    pub fn from_field_maps(maps: &[Fields]) -> Self {
        let mut columns: IndexMap<&str, ()> = IndexMap::new();
        for map in maps {
            for key in map.keys() {
                columns.entry(key.as_str()).or_insert(());
            }
        }

        let mut table = Table::new(columns.keys().map(|c| c.to_string()).collect());
        for map in maps {
            let row = columns
                .keys()
                .map(|c| map.get(*c).cloned().unwrap_or_default())
                .collect();
            table.rows.push(row);
        }
        table
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// Cell at `row` under the named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// Stack tables vertically. Columns are the union in first-seen order;
    /// cells a table lacks are empty.
    pub fn concat(tables: impl IntoIterator<Item = Table>) -> Self {
        let mut columns: IndexMap<String, ()> = IndexMap::new();
        let tables: Vec<Table> = tables.into_iter().collect();
        for table in &tables {
            for column in &table.columns {
                columns.entry(column.clone()).or_insert(());
            }
        }

        let mut merged = Table::new(columns.keys().cloned().collect());
        for table in tables {
            let positions: Vec<Option<usize>> = table
                .columns
                .iter()
                .map(|c| columns.get_index_of(c))
                .collect();
            for row in table.rows {
                let mut cells = vec![String::new(); merged.columns.len()];
                for (cell, position) in row.into_iter().zip(&positions) {
                    if let Some(index) = position {
                        cells[*index] = cell;
                    }
                }
                merged.rows.push(cells);
            }
        }
        merged
    }
}
