//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::{debug, trace};

use super::{words, PdfProcessor, PdfType, Result, WatermarkCleaner};
use crate::error::PdfError;
use crate::layout::PositionedWord;

/// Text length under which a document counts as having no text layer.
const MIN_TEXT_LAYER: usize = 50;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn check_page(&self, page: u32) -> Result<()> {
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }
        Ok(())
    }

    /// Remove secrecy watermarks from every page and refresh the bytes used for
    /// text extraction. Returns the number of content streams rewritten.
    pub fn clean_watermarks(&mut self, cleaner: &WatermarkCleaner) -> Result<usize> {
        let doc = self
            .document
            .as_mut()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;

        let cleaned = cleaner.clean_document(doc);
        if cleaned > 0 {
            let mut data = Vec::new();
            doc.save_to(&mut data)
                .map_err(|e| PdfError::Write(e.to_string()))?;
            self.raw_data = data;
        }

        debug!("Watermark cleaning rewrote {} content streams", cleaned);
        Ok(cleaned)
    }

    /// Extract all images from the entire document
    fn extract_all_images(&self) -> Vec<DynamicImage> {
        let doc = match self.document.as_ref() {
            Some(d) => d,
            None => return vec![],
        };

        let mut images = Vec::new();
        let mut seen_objects: HashSet<ObjectId> = HashSet::new();

        for (id, object) in doc.objects.iter() {
            if !seen_objects.insert(*id) {
                continue;
            }

            if let Some(img) = self.try_extract_image_from_object(doc, object) {
                images.push(img);
            }
        }

        debug!("Found {} images in document", images.len());
        images
    }

    fn try_extract_image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        let subtype = dict.get(b"Subtype").ok()?;
        if subtype.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

        trace!("Found image object: {}x{}", width, height);

        let data = match stream.decompressed_content() {
            Ok(d) => d,
            Err(_) => stream.content.clone(),
        };

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) if !arr.is_empty() => arr.first().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    trace!("Decoding JPEG image");
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Skipping image with unsupported filter");
                    return None;
                }
                _ => {}
            }
        }

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8) as u8;

        create_image_from_raw(&data, width, height, color_space, bits)
    }

    /// Get resources dictionary for a page, handling inheritance
    fn get_page_resources(&self, doc: &Document, node_id: ObjectId) -> Option<lopdf::Dictionary> {
        let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.get_page_resources(doc, *parent_id),
            _ => None,
        }
    }
}

fn create_image_from_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: u8,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let pixels = (width * height) as usize;
    let channels = match color_space {
        b"DeviceRGB" | b"RGB" => 3,
        b"DeviceGray" | b"G" => 1,
        _ => return None,
    };
    if data.len() < pixels * channels {
        trace!("Image data too short: {} < {}", data.len(), pixels * channels);
        return None;
    }

    let mut rgba = Vec::with_capacity(pixels * 4);
    for chunk in data[..pixels * channels].chunks(channels) {
        match chunk {
            [r, g, b] => rgba.extend_from_slice(&[*r, *g, *b, 255]),
            [gray] => rgba.extend_from_slice(&[*gray, *gray, *gray, 255]),
            _ => {}
        }
    }
    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Many generated payslips are encrypted with an empty user password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn analyze(&self) -> PdfType {
        let text = self.extract_text().unwrap_or_default();
        let has_text = text.trim().len() > MIN_TEXT_LAYER;
        let has_images = !self.extract_all_images().is_empty();

        let pdf_type = match (has_text, has_images) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        };

        debug!("PDF analysis: has_text={}, has_images={} -> {:?}", has_text, has_images, pdf_type);
        pdf_type
    }

    fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        self.check_page(page)?;
        self.document()?
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_words(&self, page: u32) -> Result<Vec<PositionedWord>> {
        self.check_page(page)?;
        words::page_words(self.document()?, page)
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;

        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();

        if let Some(resources) = self.get_page_resources(doc, *page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = doc.dereference(obj_ref) {
                            if let Some(img) = self.try_extract_image_from_object(doc, obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        // Scanned files often hang images off shared resources
        if images.is_empty() && self.page_count() == 1 {
            debug!("No XObject images found on page {}, scanning all objects", page);
            images = self.extract_all_images();
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }

    fn write_subset(&self, pages: &[u32]) -> Result<Vec<u8>> {
        for &page in pages {
            self.check_page(page)?;
        }

        let mut subset = self.document()?.clone();
        let dropped: Vec<u32> = (1..=self.page_count())
            .filter(|p| !pages.contains(p))
            .collect();
        subset.delete_pages(&dropped);
        subset.prune_objects();

        let mut data = Vec::new();
        subset
            .save_to(&mut data)
            .map_err(|e| PdfError::Write(e.to_string()))?;
        debug!("Wrote subset of {} pages ({} bytes)", pages.len(), data.len());
        Ok(data)
    }
}
