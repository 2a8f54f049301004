//! Generic table-structure inference for text no document model recognized.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::record::{Fields, Table};

lazy_static! {
    static ref CELL_SEPARATOR: Regex = Regex::new(r"\s{2,}|\t").unwrap();
    static ref NUMERIC_CELL: Regex = Regex::new(r"^[\d.,]+$").unwrap();
}

/// Column name used when the text has neither columns nor key/value pairs.
pub const TEXT_LINES_COLUMN: &str = "Linhas do Texto";

fn split_cells(line: &str) -> Vec<String> {
    CELL_SEPARATOR.split(line).map(str::to_string).collect()
}

/// Most frequent value; ties go to the smallest value.
fn modal_count(counts: &[usize]) -> usize {
    let mut frequency: IndexMap<usize, usize> = IndexMap::new();
    for &count in counts {
        *frequency.entry(count).or_insert(0) += 1;
    }

    frequency
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map_or(0, |(value, _)| value)
}

fn looks_like_header(row: &[String]) -> bool {
    row.iter()
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .all(|cell| !NUMERIC_CELL.is_match(cell))
}

/// Guess a table from plain text.
///
/// Lines are split into cells on runs of two or more spaces or a tab. When
/// most lines have several cells, every line is padded or truncated to that
/// count and a non-numeric first row becomes the header. Otherwise the text is
/// read as `key: value` pairs, and failing that, as one column of lines.
pub fn infer_table(text: &str) -> Table {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Table::empty();
    }

    let rows: Vec<Vec<String>> = lines.iter().map(|l| split_cells(l)).collect();
    let counts: Vec<usize> = rows.iter().map(Vec::len).collect();
    let width = modal_count(&counts);
    debug!("Inferring table: {} lines, modal width {}", lines.len(), width);

    if width > 1 {
        return columnar(rows, width);
    }

    let mut pairs = Fields::new();
    for line in &lines {
        if let Some((key, value)) = line.split_once(':') {
            pairs.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    if !pairs.is_empty() {
        return Table::from_field_maps(std::slice::from_ref(&pairs));
    }

    let mut table = Table::new(vec![TEXT_LINES_COLUMN.to_string()]);
    for line in lines {
        table.push_row(vec![line.to_string()]);
    }
    table
}

fn columnar(mut rows: Vec<Vec<String>>, width: usize) -> Table {
    for row in rows.iter_mut() {
        row.resize(width, String::new());
    }

    let columns: Vec<String> = if rows.len() > 1 && looks_like_header(&rows[0]) {
        rows.remove(0).into_iter().map(|c| c.trim().to_string()).collect()
    } else {
        (1..=width).map(|i| format!("Coluna {}", i)).collect()
    };

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row);
    }
    table
}
