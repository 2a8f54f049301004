//! End-to-end document processing.
//!
//! Pages come in as text (or are built from positioned words), a model is
//! chosen by name or by detection, each page is extracted, and multi-page
//! documents are consolidated by period. Text no model recognizes gets a
//! generic table instead.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{DocumentModel, ModelRegistry, AUTO_DETECT};
use crate::consolidate::ConsolidatedDataset;
use crate::entities::{extract_entities, EntityReport};
use crate::error::{PdfError, Result};
use crate::layout::{LineReconstructor, PositionedWord};
use crate::models::config::BrdocConfig;
use crate::models::record::{ExtractionRecord, Table};
use crate::ocr::OcrBackend;
use crate::pdf::{PdfExtractor, PdfProcessor, WatermarkCleaner};
use crate::table::infer_table;

/// Page separator in plain-text sources.
pub const FORM_FEED: char = '\u{c}';

/// Text of one page, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInput {
    pub number: usize,
    pub text: String,
}

impl PageInput {
    pub fn from_text(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// Rebuild the page text from positioned words.
    pub fn from_words(number: usize, words: &[PositionedWord], reconstructor: &LineReconstructor) -> Self {
        Self::from_text(number, reconstructor.reconstruct_text(words))
    }

    /// Split a plain-text source into pages on form feeds.
    pub fn split_pages(text: &str) -> Vec<Self> {
        text.split(FORM_FEED)
            .enumerate()
            .map(|(i, page)| Self::from_text(i + 1, page))
            .collect()
    }
}

/// Record extracted from one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    pub page: usize,
    pub record: ExtractionRecord,
}

/// Result of processing one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// File name or other label of the input.
    pub source: String,
    /// Model used, `None` when the generic table was inferred.
    pub model: Option<&'static str>,
    /// Detection score, absent when the model was named.
    pub score: Option<f32>,
    /// Per-page records, in page order.
    pub pages: Vec<PageRecord>,
    /// Period-merged data for multi-page documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consolidated: Option<ConsolidatedDataset>,
    /// Export table.
    pub table: Table,
    /// Generic entities found in the whole text.
    pub entities: EntityReport,
    /// Page texts joined with newlines.
    #[serde(skip)]
    pub text: String,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Document pipeline over a model registry.
pub struct DocumentProcessor {
    registry: ModelRegistry,
    config: BrdocConfig,
    reconstructor: LineReconstructor,
    ocr: Option<Box<dyn OcrBackend>>,
}

impl DocumentProcessor {
    /// Create a processor over the built-in models.
    pub fn new(config: BrdocConfig) -> Self {
        Self::with_registry(ModelRegistry::builtin(), config)
    }

    pub fn with_registry(registry: ModelRegistry, config: BrdocConfig) -> Self {
        let reconstructor = LineReconstructor::new().with_tolerance(config.layout.line_tolerance);
        Self {
            registry,
            config,
            reconstructor,
            ocr: None,
        }
    }

    /// Attach an OCR backend for image-only pages.
    pub fn with_ocr(mut self, backend: Box<dyn OcrBackend>) -> Self {
        self.ocr = Some(backend);
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BrdocConfig {
        &self.config
    }

    pub fn reconstructor(&self) -> &LineReconstructor {
        &self.reconstructor
    }

    /// Process a plain-text source, pages separated by form feeds.
    pub fn process_text(&self, source: &str, text: &str, model: Option<&str>) -> Result<ExtractionResult> {
        self.process_pages(source, PageInput::split_pages(text), model)
    }

    /// Process already-split pages.
    pub fn process_pages(
        &self,
        source: &str,
        pages: Vec<PageInput>,
        model: Option<&str>,
    ) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();
        let chosen = self.choose_model(source, &pages, model, &mut warnings)?;
        Ok(self.run(source, pages, chosen, warnings, start))
    }

    /// Process a PDF. `pages` selects 1-based pages; `None` means all, capped by
    /// `pdf.max_pages`.
    pub fn process_pdf(
        &self,
        source: &str,
        data: &[u8],
        pages: Option<&[u32]>,
        model: Option<&str>,
    ) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let mut extractor = PdfExtractor::new();
        extractor.load(data)?;
        let numbers = self.page_numbers(extractor.page_count(), pages)?;
        info!("Processing {} ({} of {} pages)", source, numbers.len(), extractor.page_count());

        let mut inputs = self.read_pages(&extractor, &numbers, &mut warnings)?;
        let chosen = self.choose_model(source, &inputs, model, &mut warnings)?;

        if let Some((model, _)) = chosen {
            if model.descriptor().requires_cleaning && self.config.pdf.clean_watermarks {
                match extractor.clean_watermarks(&WatermarkCleaner::new()) {
                    Ok(0) => debug!("No watermarks found in {}", source),
                    Ok(_) => inputs = self.read_pages(&extractor, &numbers, &mut warnings)?,
                    Err(e) => {
                        warn!("Watermark cleaning failed for {}: {}", source, e);
                        warnings.push(format!("Watermark cleaning failed, using original text: {}", e));
                    }
                }
            }
        }

        Ok(self.run(source, inputs, chosen, warnings, start))
    }

    /// Pick the model: an explicit name, then the configured default, then
    /// detection. Detection scores at or below `detection.min_score` pick
    /// nothing, and so does a source without any text.
    fn choose_model(
        &self,
        source: &str,
        pages: &[PageInput],
        model: Option<&str>,
        warnings: &mut Vec<String>,
    ) -> Result<Option<(&dyn DocumentModel, Option<f32>)>> {
        if pages.iter().all(|p| p.text.trim().is_empty()) {
            warn!("No text found in {}", source);
            warnings.push("No text found in the document; nothing to extract".to_string());
            return Ok(None);
        }

        let name = model
            .or(self.config.detection.default_model.as_deref())
            .filter(|n| *n != AUTO_DETECT);
        if let Some(name) = name {
            return Ok(Some((self.registry.resolve(name)?, None)));
        }

        let text = joined_text(pages);
        match self.registry.auto_detect(&text) {
            Some((model, score)) if score > self.config.detection.min_score => {
                info!("Detected {} (score {:.2})", model.name(), score);
                Ok(Some((model, Some(score))))
            }
            best => {
                let score = best.map(|(_, s)| s).unwrap_or(0.0);
                warnings.push(format!(
                    "No model scored above {:.2} (best {:.2}); inferred a generic table",
                    self.config.detection.min_score, score
                ));
                Ok(None)
            }
        }
    }

    fn run(
        &self,
        source: &str,
        pages: Vec<PageInput>,
        chosen: Option<(&dyn DocumentModel, Option<f32>)>,
        mut warnings: Vec<String>,
        start: Instant,
    ) -> ExtractionResult {
        let text = joined_text(&pages);
        let entities = extract_entities(&text, &self.registry);

        let mut result = ExtractionResult {
            source: source.to_string(),
            model: None,
            score: None,
            pages: Vec::new(),
            consolidated: None,
            table: Table::empty(),
            entities,
            text: String::new(),
            warnings: Vec::new(),
            processing_time_ms: 0,
        };

        match chosen {
            Some((model, score)) => {
                result.model = Some(model.name());
                result.score = score;
                result.pages = pages
                    .iter()
                    .map(|page| PageRecord {
                        page: page.number,
                        record: model.extract(&page.text),
                    })
                    .collect();

                let empty_pages = result.pages.iter().filter(|p| p.record.is_empty()).count();
                if empty_pages > 0 {
                    warnings.push(format!("{} page(s) produced no fields", empty_pages));
                }

                if self.config.output.consolidate && result.pages.len() > 1 {
                    result.consolidated = self.consolidate(model, &result.pages, &mut warnings);
                }
                result.table = match &result.consolidated {
                    Some(dataset) => dataset.to_table(),
                    None => Table::concat(result.pages.iter().map(|p| model.to_table(&p.record))),
                };
            }
            None => result.table = infer_table(&text),
        }

        result.text = text;
        result.warnings = warnings;
        result.processing_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Processed {} in {}ms ({} rows, {} warnings)",
            source,
            result.processing_time_ms,
            result.table.len(),
            result.warnings.len()
        );
        result
    }

    fn consolidate(
        &self,
        model: &dyn DocumentModel,
        pages: &[PageRecord],
        warnings: &mut Vec<String>,
    ) -> Option<ConsolidatedDataset> {
        let entries: Vec<_> = pages
            .iter()
            .flat_map(|p| model.period_entries(&p.record, p.page))
            .collect();

        let unkeyed = entries.iter().filter(|e| e.key.is_none()).count();
        if unkeyed > 0 {
            warnings.push(format!("{} entries without a period were skipped", unkeyed));
        }

        let dataset = ConsolidatedDataset::consolidate(entries);
        if dataset.is_empty() {
            warnings.push("No period found on any page; keeping per-page tables".to_string());
            return None;
        }
        info!("Consolidated {} pages into {} periods", pages.len(), dataset.len());
        Some(dataset)
    }

    fn page_numbers(&self, count: u32, requested: Option<&[u32]>) -> Result<Vec<u32>> {
        let numbers: Vec<u32> = match requested {
            Some(pages) => {
                if let Some(&bad) = pages.iter().find(|&&p| p == 0 || p > count) {
                    return Err(PdfError::InvalidPage(bad).into());
                }
                pages.to_vec()
            }
            None => (1..=count).collect(),
        };

        let max = self.config.pdf.max_pages;
        if requested.is_none() && max > 0 && numbers.len() > max {
            debug!("Limiting to the first {} of {} pages", max, numbers.len());
            return Ok(numbers.into_iter().take(max).collect());
        }
        Ok(numbers)
    }

    fn read_pages(
        &self,
        extractor: &PdfExtractor,
        numbers: &[u32],
        warnings: &mut Vec<String>,
    ) -> Result<Vec<PageInput>> {
        numbers
            .iter()
            .map(|&n| self.read_page(extractor, n, warnings))
            .collect()
    }

    /// Page text from positioned words, then the plain text layer, then OCR.
    fn read_page(
        &self,
        extractor: &PdfExtractor,
        number: u32,
        warnings: &mut Vec<String>,
    ) -> Result<PageInput> {
        let page = number as usize;

        let mut text = String::new();
        if self.config.pdf.prefer_positioned_words {
            match extractor.extract_page_words(number) {
                Ok(words) if !words.is_empty() => {
                    text = self.reconstructor.reconstruct_text(&words);
                }
                Ok(_) => debug!("Page {} has no positioned words", number),
                Err(PdfError::InvalidPage(n)) => return Err(PdfError::InvalidPage(n).into()),
                Err(e) => debug!("Positioned words failed on page {}: {}", number, e),
            }
        }

        if text.trim().is_empty() {
            match extractor.extract_page_text(number) {
                Ok(plain) => text = plain,
                Err(e) => warnings.push(format!("Page {}: text extraction failed: {}", number, e)),
            }
        }

        if text.trim().len() < self.config.pdf.min_text_length && self.config.ocr.enabled {
            if let Some(ocr_text) = self.ocr_page(extractor, number, warnings)? {
                text = ocr_text;
            }
        }

        Ok(PageInput::from_text(page, text))
    }

    fn ocr_page(
        &self,
        extractor: &PdfExtractor,
        number: u32,
        warnings: &mut Vec<String>,
    ) -> Result<Option<String>> {
        let Some(backend) = self.ocr.as_ref() else {
            warnings.push(format!("Page {} needs OCR but no backend is configured", number));
            return Ok(None);
        };

        let images = extractor.extract_images(number)?;
        let mut words = Vec::new();
        for image in &images {
            match backend.recognize_words(image, &self.config.ocr.language) {
                Ok(found) => words.extend(found),
                Err(e) => warnings.push(format!("Page {}: {} failed: {}", number, backend.name(), e)),
            }
        }

        debug!("OCR produced {} words on page {}", words.len(), number);
        Ok((!words.is_empty()).then(|| self.reconstructor.reconstruct_text(&words)))
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(BrdocConfig::default())
    }
}

fn joined_text(pages: &[PageInput]) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::PERIOD_COLUMN;
    use pretty_assertions::assert_eq;

    const RECIBO: &str = "RECIBO\nRecebi de FULANO DE TAL a importância de R$ 1.250,00\n\
                          referente ao aluguel. CPF 123.456.789-09\nSão Paulo, 05/03/2024";

    #[test]
    fn test_split_pages_on_form_feed() {
        let pages = PageInput::split_pages("um\u{c}dois\u{c}três");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2], PageInput::from_text(3, "três"));
    }

    #[test]
    fn test_from_words_reconstructs_lines() {
        let words = vec![
            PositionedWord::new("Total", 20.0, 10.0),
            PositionedWord::new("RECIBO", 5.0, 10.0),
            PositionedWord::new("10,00", 21.0, 80.0),
        ];
        let page = PageInput::from_words(1, &words, &LineReconstructor::new());
        assert_eq!(page.text, "RECIBO\nTotal 10,00");
    }

    #[test]
    fn test_detected_model_extracts_page() {
        let processor = DocumentProcessor::default();
        let result = processor.process_text("recibo.txt", RECIBO, None).unwrap();

        assert_eq!(result.model, Some("Recibo de Pagamento"));
        assert!(result.score.unwrap() > 0.3);
        assert_eq!(result.page_count(), 1);
        assert!(result.consolidated.is_none());
        assert_eq!(result.pages[0].record.get("valor"), Some("1.250,00"));
        assert_eq!(result.table.cell(0, "valor"), Some("1.250,00"));
        assert!(result.entities.document_type.starts_with("Recibo de Pagamento"));
    }

    #[test]
    fn test_unknown_text_gets_generic_table() {
        let processor = DocumentProcessor::default();
        let result = processor
            .process_text("notas.txt", "Nome: Maria\nCidade: Recife", None)
            .unwrap();

        assert_eq!(result.model, None);
        assert!(result.pages.is_empty());
        assert_eq!(result.table.columns, vec!["Nome", "Cidade"]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_named_model_skips_detection() {
        let processor = DocumentProcessor::default();
        let result = processor
            .process_text("x.txt", "texto sem marcas", Some("Recibo de Pagamento"))
            .unwrap();
        assert_eq!(result.model, Some("Recibo de Pagamento"));
        assert_eq!(result.score, None);
    }

    #[test]
    fn test_unknown_model_name_is_an_error() {
        let processor = DocumentProcessor::default();
        assert!(processor.process_text("x.txt", "abc", Some("Inexistente")).is_err());
    }

    #[test]
    fn test_blank_source_yields_empty_result() {
        let processor = DocumentProcessor::default();
        let result = processor.process_text("vazio.txt", " \n\u{c}\n", None).unwrap();

        assert_eq!(result.model, None);
        assert!(result.pages.is_empty());
        assert!(result.table.is_empty());
        assert!(result.table.columns.is_empty());
        assert_eq!(result.warnings, vec!["No text found in the document; nothing to extract"]);
    }

    #[test]
    fn test_blank_source_with_named_model_is_not_an_error() {
        let processor = DocumentProcessor::default();
        let result = processor
            .process_pages("vazio.txt", vec![PageInput::from_text(1, "")], Some("Recibo de Pagamento"))
            .unwrap();
        assert_eq!(result.model, None);
        assert!(result.table.is_empty());
    }

    #[test]
    fn test_multi_page_per_page_consolidation() {
        let processor = DocumentProcessor::default();
        let text = format!("{}\u{c}{}", RECIBO, RECIBO.replace("1.250,00", "980,00"));
        let result = processor
            .process_text("recibos.txt", &text, Some("Recibo de Pagamento"))
            .unwrap();

        let dataset = result.consolidated.as_ref().unwrap();
        assert_eq!(dataset.keys().collect::<Vec<_>>(), vec!["página 1", "página 2"]);
        assert_eq!(result.table.columns[0], PERIOD_COLUMN);
        assert_eq!(result.table.cell(1, "valor"), Some("980,00"));
    }

    #[test]
    fn test_consolidation_can_be_disabled() {
        let mut config = BrdocConfig::default();
        config.output.consolidate = false;
        let processor = DocumentProcessor::new(config);
        let text = format!("{}\u{c}{}", RECIBO, RECIBO);
        let result = processor
            .process_text("recibos.txt", &text, Some("Recibo de Pagamento"))
            .unwrap();

        assert!(result.consolidated.is_none());
        assert_eq!(result.table.len(), 2);
    }

    #[test]
    fn test_default_model_from_config() {
        let mut config = BrdocConfig::default();
        config.detection.default_model = Some("Recibo de Pagamento".to_string());
        let processor = DocumentProcessor::new(config);
        let result = processor.process_text("x.txt", "qualquer coisa", None).unwrap();
        assert_eq!(result.model, Some("Recibo de Pagamento"));
    }

    #[test]
    fn test_page_numbers() {
        let mut config = BrdocConfig::default();
        config.pdf.max_pages = 2;
        let processor = DocumentProcessor::new(config);

        assert_eq!(processor.page_numbers(5, None).unwrap(), vec![1, 2]);
        assert_eq!(processor.page_numbers(5, Some(&[4, 5])).unwrap(), vec![4, 5]);
        assert!(processor.page_numbers(5, Some(&[6])).is_err());
    }

    #[test]
    fn test_process_pdf_rejects_garbage() {
        let processor = DocumentProcessor::default();
        assert!(processor.process_pdf("x.pdf", b"%PDF-broken", None, None).is_err());
    }

    /// A one-page PDF whose only content is a 4x2 gray image.
    fn scanned_pdf() -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 4,
                "Height" => 2,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![200u8; 8],
        ));
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![400.into(), 0.into(), 0.into(), 200.into(), 50.into(), 500.into()],
                ),
                Operation::new("Do", vec!["Im1".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im1" => image_id },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    /// Reads the receipt off any image, one box per line.
    struct ReceiptReader;

    impl OcrBackend for ReceiptReader {
        fn name(&self) -> &str {
            "receipt-reader"
        }

        fn recognize(
            &self,
            image: &image::DynamicImage,
            language: &str,
        ) -> std::result::Result<crate::ocr::OcrOutput, crate::error::OcrError> {
            assert_eq!(language, "por");
            crate::ocr::validate_image(image)?;
            let boxes = RECIBO
                .lines()
                .enumerate()
                .map(|(i, line)| crate::ocr::TextBox::from_rect(line, 10.0, 20.0 * i as f32, 300.0, 12.0))
                .collect();
            Ok(crate::ocr::OcrOutput::from_boxes(
                boxes,
                (image.width(), image.height()),
                &LineReconstructor::new(),
            ))
        }
    }

    fn ocr_config() -> BrdocConfig {
        let mut config = BrdocConfig::default();
        config.ocr.enabled = true;
        config
    }

    #[test]
    fn test_scanned_page_goes_through_ocr() {
        let processor = DocumentProcessor::new(ocr_config()).with_ocr(Box::new(ReceiptReader));
        let result = processor.process_pdf("scan.pdf", &scanned_pdf(), None, None).unwrap();

        assert_eq!(result.model, Some("Recibo de Pagamento"));
        assert_eq!(result.pages[0].record.get("valor"), Some("1.250,00"));
        assert!(result.text.contains("Recebi de FULANO DE TAL"));
    }

    #[test]
    fn test_scanned_page_without_backend_warns() {
        let processor = DocumentProcessor::new(ocr_config());
        let result = processor.process_pdf("scan.pdf", &scanned_pdf(), None, None).unwrap();

        assert_eq!(result.model, None);
        assert!(result
            .warnings
            .iter()
            .any(|w| w == "Page 1 needs OCR but no backend is configured"));
    }
}
