//! OCR collaborator interface.
//!
//! No recognition engine ships with the crate. Callers that need scanned-page
//! support plug a backend in through [`OcrBackend`]; the engine only consumes
//! its text or positioned words.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::layout::{LineReconstructor, PositionedWord};

/// A recognized text box with its coordinates and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Axis-aligned box from its top-left corner and size.
    pub fn from_rect(text: impl Into<String>, left: f32, top: f32, width: f32, height: f32) -> Self {
        let (right, bottom) = (left + width, top + height);
        Self {
            bbox: [left, top, right, top, right, bottom, left, bottom],
            text: text.into(),
            confidence: 1.0,
        }
    }

    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }

    /// The box as a word anchored at its top-left corner.
    pub fn to_word(&self) -> PositionedWord {
        let (left, top, _, _) = self.rect();
        PositionedWord::new(self.text.trim(), top, left)
    }
}

/// Result of recognizing one page image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrOutput {
    /// Recognized boxes, in backend order.
    pub boxes: Vec<TextBox>,

    /// Full page text.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrOutput {
    /// Create an empty result.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            text: String::new(),
            processing_time_ms: 0,
            image_size: (width, height),
        }
    }

    /// Build an output from boxes, deriving the text by line reconstruction.
    pub fn from_boxes(boxes: Vec<TextBox>, image_size: (u32, u32), reconstructor: &LineReconstructor) -> Self {
        let mut output = Self {
            boxes,
            ..Self::empty(image_size.0, image_size.1)
        };
        output.text = reconstructor.reconstruct_text(&output.words());
        output
    }

    /// Boxes as positioned words, skipping blank ones.
    pub fn words(&self) -> Vec<PositionedWord> {
        self.boxes
            .iter()
            .map(TextBox::to_word)
            .filter(|w| !w.text.is_empty())
            .collect()
    }
}

/// A raster-page recognizer.
pub trait OcrBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Recognize one page image. `language` is a Tesseract-style code such
    /// as `por`.
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<OcrOutput, OcrError>;

    /// Plain text of a page image.
    fn recognize_text(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
        Ok(self.recognize(image, language)?.text)
    }

    /// Positioned words of a page image.
    fn recognize_words(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<Vec<PositionedWord>, OcrError> {
        Ok(self.recognize(image, language)?.words())
    }
}

/// Reject images no backend can work with.
pub fn validate_image(image: &DynamicImage) -> Result<(), OcrError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(OcrError::InvalidImage(format!(
            "{}x{} image",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Canned(Vec<TextBox>);

    impl OcrBackend for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn recognize(&self, image: &DynamicImage, language: &str) -> Result<OcrOutput, OcrError> {
            validate_image(image)?;
            if language != "por" {
                return Err(OcrError::MissingLanguage(language.to_string()));
            }
            Ok(OcrOutput::from_boxes(
                self.0.clone(),
                (image.width(), image.height()),
                &LineReconstructor::new(),
            ))
        }
    }

    fn page() -> Canned {
        Canned(vec![
            TextBox::from_rect("1.500,00", 300.0, 41.0, 60.0, 12.0),
            TextBox::from_rect("Salário", 20.0, 40.0, 50.0, 12.0),
            TextBox::from_rect("  ", 90.0, 40.0, 10.0, 12.0),
            TextBox::from_rect("INSS", 20.0, 60.0, 30.0, 12.0),
        ])
    }

    #[test]
    fn test_text_box_rect_and_word() {
        let text_box = TextBox::from_rect("Total", 10.0, 20.0, 30.0, 8.0);
        assert_eq!(text_box.rect(), (10.0, 20.0, 40.0, 28.0));
        assert_eq!(text_box.to_word(), PositionedWord::new("Total", 20.0, 10.0));
    }

    #[test]
    fn test_recognize_text_rebuilds_lines() {
        let image = DynamicImage::new_rgb8(400, 200);
        let text = page().recognize_text(&image, "por").unwrap();
        assert_eq!(text, "Salário 1.500,00\nINSS");
    }

    #[test]
    fn test_recognize_words_skips_blank_boxes() {
        let image = DynamicImage::new_rgb8(400, 200);
        let words = page().recognize_words(&image, "por").unwrap();
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn test_backend_errors_are_typed() {
        let backend = page();
        assert!(matches!(
            backend.recognize_text(&DynamicImage::new_rgb8(0, 0), "por"),
            Err(OcrError::InvalidImage(_))
        ));
        assert!(matches!(
            backend.recognize_text(&DynamicImage::new_rgb8(10, 10), "eng"),
            Err(OcrError::MissingLanguage(_))
        ));
    }
}
