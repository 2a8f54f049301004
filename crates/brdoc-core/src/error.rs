//! Error types for the brdoc-core library.

use thiserror::Error;

/// Main error type for the brdoc library.
#[derive(Error, Debug)]
pub enum BrdocError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR collaborator error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// Failed to rewrite the document (cleaning pass or page subset).
    #[error("failed to write PDF: {0}")]
    Write(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors reported by an OCR backend.
#[derive(Error, Debug)]
pub enum OcrError {
    /// No OCR engine is installed or configured.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The requested language pack is missing.
    #[error("language pack not installed: {0}")]
    MissingLanguage(String),

    /// Recognition failed on the given page image.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to document extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A model name was given that is not in the catalog.
    #[error("unknown document model: {0}")]
    UnknownModel(String),
}

/// Result type for the brdoc library.
pub type Result<T> = std::result::Result<T, BrdocError>;
