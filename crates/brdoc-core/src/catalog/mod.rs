//! Document model catalog.
//!
//! Every vendor layout is a [`DocumentModel`]: a descriptor plus a detection
//! heuristic and an extraction parser working on reconstructed line text.
//! Models are grouped by document type:
//! - `payslip`: eight payslip (contracheque) layouts
//! - `timecard`: six timecard (cartão ponto) layouts
//! - single-variant handlers for NF-e, NFS-e, bank slips, receipts, bank
//!   statements and contracts

pub mod boleto;
pub mod contract;
pub mod invoice;
pub mod payslip;
pub mod receipt;
pub mod region;
pub mod registry;
pub mod statement;
pub mod timecard;

pub use registry::{ModelRegistry, Processed, AUTO_DETECT};

use serde::Serialize;

use crate::consolidate::{period_entries, PeriodEntry};
use crate::models::record::{ExtractionRecord, Table};

/// How a record is keyed when pages are consolidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "policy", content = "field", rename_all = "snake_case")]
pub enum PeriodPolicy {
    /// One key per document, read from a document-level field.
    DocumentField(&'static str),
    /// One key per table row, read from a row field.
    PerRow(&'static str),
    /// One key per page (`página N`).
    PerPage,
}

/// Immutable description of a document model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    /// Unique display name, used to address the model.
    pub name: &'static str,
    /// Icon hint for front ends.
    pub icon: &'static str,
    pub description: &'static str,
    /// Document type the layout belongs to.
    pub category: &'static str,
    /// Layout flavor within the category.
    pub variant: &'static str,
    pub period: PeriodPolicy,
    /// PDF sources must pass through the watermark cleaner first.
    pub requires_cleaning: bool,
}

/// A document layout with detection and extraction.
pub trait DocumentModel: Send + Sync {
    fn descriptor(&self) -> &ModelDescriptor;

    /// Confidence in `[0, 1]` that `text` has this layout.
    fn detect(&self, text: &str) -> f32;

    /// Parse `text`. Absent fields are absent keys, malformed rows are skipped.
    fn extract(&self, text: &str) -> ExtractionRecord;

    /// Tabular export shape of a record.
    fn to_table(&self, record: &ExtractionRecord) -> Table {
        record.to_table()
    }

    /// Flatten a record of page `page` (1-based) into consolidation entries.
    fn period_entries(&self, record: &ExtractionRecord, page: usize) -> Vec<PeriodEntry> {
        period_entries(self.descriptor().period, record, page)
    }

    fn name(&self) -> &'static str {
        self.descriptor().name
    }
}

/// Trimmed, non-empty lines of `text`.
pub(crate) fn text_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// Collapse whitespace runs into single spaces.
pub(crate) fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
