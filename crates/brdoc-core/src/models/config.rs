//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::layout::DEFAULT_LINE_TOLERANCE;

/// Main configuration for the brdoc pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrdocConfig {
    /// Line reconstruction configuration.
    pub layout: LayoutConfig,

    /// Model selection configuration.
    pub detection: DetectionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR collaborator configuration.
    pub ocr: OcrConfig,

    /// Export configuration.
    pub output: OutputConfig,
}

impl Default for BrdocConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            detection: DetectionConfig::default(),
            pdf: PdfConfig::default(),
            ocr: OcrConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Line reconstruction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical tolerance for grouping words into one line, in page units.
    pub line_tolerance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: DEFAULT_LINE_TOLERANCE,
        }
    }
}

/// Model selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Scores at or below this floor fall back to generic table inference.
    pub min_score: f32,

    /// Model used when none is given on the command line.
    pub default_model: Option<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_score: 0.3,
            default_model: None,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Run the watermark cleaner for models that need it.
    pub clean_watermarks: bool,

    /// Rebuild lines from positioned words instead of plain page text.
    pub prefer_positioned_words: bool,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,

    /// Minimum text length to consider a page as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            clean_watermarks: true,
            prefer_positioned_words: true,
            max_pages: 0,
            min_text_length: 20,
        }
    }
}

/// OCR collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Language pack requested from the backend.
    pub language: String,

    /// Send image-only pages to the OCR backend.
    pub enabled: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "por".to_string(),
            enabled: false,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV field delimiter.
    pub csv_delimiter: char,

    /// Merge multi-page results by period.
    pub consolidate: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_delimiter: ';',
            consolidate: true,
        }
    }
}

impl BrdocConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// CSV delimiter as a byte, falling back to `;` for non-ASCII settings.
    pub fn csv_delimiter(&self) -> u8 {
        u8::try_from(self.output.csv_delimiter).unwrap_or(b';')
    }
}
