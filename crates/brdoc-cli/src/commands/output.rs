//! Rendering of extraction results as JSON, CSV or a text summary.

use chrono::Local;
use serde::Serialize;

use brdoc_core::engine::ExtractionResult;
use brdoc_core::Table;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generator: String,
    generated_at: String,
    #[serde(flatten)]
    result: &'a ExtractionResult,
}

fn generated_at() -> String {
    Local::now().format("%d/%m/%Y %H:%M:%S").to_string()
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat, delimiter: u8) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(result),
        OutputFormat::Csv => format_csv(&result.table, delimiter),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_json(result: &ExtractionResult) -> anyhow::Result<String> {
    let report = JsonReport {
        generator: format!("brdoc {}", env!("CARGO_PKG_VERSION")),
        generated_at: generated_at(),
        result,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// The table as delimited text, header first.
pub fn format_csv(table: &Table, delimiter: u8) -> anyhow::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(vec![]);

    if !table.columns.is_empty() {
        wtr.write_record(&table.columns)?;
    }
    for row in &table.rows {
        wtr.write_record(row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Arquivo: {}\n", result.source));
    match (result.model, result.score) {
        (Some(model), Some(score)) => {
            output.push_str(&format!("Modelo: {} (confiança: {:.0}%)\n", model, score * 100.0))
        }
        (Some(model), None) => output.push_str(&format!("Modelo: {}\n", model)),
        (None, _) => output.push_str("Modelo: nenhum (tabela genérica)\n"),
    }
    output.push_str(&format!("Tipo: {}\n", result.entities.document_type));
    output.push_str(&format!("Páginas: {}\n", result.page_count()));
    output.push_str(&format!("Gerado em: {}\n", generated_at()));

    for (i, row) in result.table.rows.iter().enumerate() {
        output.push_str(&format!("\nRegistro {}:\n", i + 1));
        for (column, value) in result.table.columns.iter().zip(row) {
            if !value.is_empty() {
                output.push_str(&format!("  {}: {}\n", column, value));
            }
        }
    }

    if !result.warnings.is_empty() {
        output.push_str("\nAvisos:\n");
        for warning in &result.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}
