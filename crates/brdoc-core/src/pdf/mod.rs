//! PDF access: page text, positioned words, embedded images, page subsets and
//! watermark cleaning.

mod cleaner;
mod extractor;
mod words;

pub use cleaner::WatermarkCleaner;
pub use extractor::PdfExtractor;
pub use words::page_words;

use crate::error::PdfError;
use crate::layout::PositionedWord;
use image::DynamicImage;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations. Pages are 1-based.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Analyze the PDF to determine its type.
    fn analyze(&self) -> PdfType;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page.
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Words of a page with page-relative positions, `top` growing downward.
    fn extract_page_words(&self, page: u32) -> Result<Vec<PositionedWord>>;

    /// Extract embedded images from a page.
    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>>;

    /// Serialize a new document holding only the given pages.
    fn write_subset(&self, pages: &[u32]) -> Result<Vec<u8>>;
}
