//! Core library for Brazilian document extraction.
//!
//! This crate provides:
//! - Line reconstruction from positioned PDF/OCR words
//! - Brazilian money parsing and generic entity extraction (CPF, CNPJ, dates, amounts)
//! - A catalog of document models (payslips, timecards, invoices, bank slips, receipts,
//!   bank statements, contracts) with detection and extraction
//! - Multi-page consolidation keyed by period
//! - Generic table-structure inference for unknown documents
//! - PDF access (per-page text, positioned words, watermark cleaning) and an OCR interface

pub mod catalog;
pub mod consolidate;
pub mod engine;
pub mod entities;
pub mod error;
pub mod layout;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod rules;
pub mod table;

pub use catalog::{DocumentModel, ModelDescriptor, ModelRegistry, PeriodPolicy, Processed};
pub use consolidate::{ConsolidatedDataset, PeriodEntry};
pub use engine::{DocumentProcessor, ExtractionResult, PageInput};
pub use entities::{extract_entities, EntityKind, EntityReport};
pub use error::{BrdocError, Result};
pub use layout::{reconstruct_lines, LineReconstructor, PositionedWord};
pub use models::config::BrdocConfig;
pub use models::record::{ExtractionRecord, Fields, RowsLabel, Table};
pub use ocr::{OcrBackend, OcrOutput};
pub use pdf::{PdfExtractor, PdfProcessor, PdfType, WatermarkCleaner};
pub use rules::money::{format_br_amount, parse_br_amount, MoneyValue};
pub use table::infer_table;
