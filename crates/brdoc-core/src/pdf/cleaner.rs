//! Removal of secrecy watermarks from page content streams.
//!
//! Some HR portals stamp every page with a large "Documento em sigilo" banner
//! and a "Usuário em visibilidade: ..." line. Both are drawn as standalone
//! hex-string text objects, which interleave with the real text once the page
//! is extracted.

use lazy_static::lazy_static;
use lopdf::{Document, Object};
use regex::bytes::Regex;
use tracing::{debug, trace};

lazy_static! {
    /// "Documento em sigilo" at 40pt.
    static ref SECRECY_BANNER: Regex = Regex::new(
        r"(?s-u)BT\s*/F1\s+40\s+Tf\s+[^<]+<(?i:446f63756d656e746f20656d20736967696c6f)[^>]*>\s*Tj\s+ET"
    )
    .unwrap();
    /// "Usuário em visibilidade: ..." at 24pt.
    static ref VISIBILITY_LINE: Regex =
        Regex::new(r"(?s-u)BT\s*/F1\s+24\s+Tf\s+[^<]+<(?i:557375)[^>]*>\s*Tj\s+ET").unwrap();
}

/// Strips known watermark text objects from content streams.
#[derive(Debug, Clone)]
pub struct WatermarkCleaner {
    patterns: Vec<Regex>,
}

impl WatermarkCleaner {
    /// Cleaner for the secrecy banner and the visibility line.
    pub fn new() -> Self {
        Self {
            patterns: vec![SECRECY_BANNER.clone(), VISIBILITY_LINE.clone()],
        }
    }

    /// The cleaned stream, or `None` when no watermark was found.
    pub fn clean_stream(&self, content: &[u8]) -> Option<Vec<u8>> {
        let mut cleaned = content.to_vec();
        for pattern in &self.patterns {
            cleaned = pattern.replace_all(&cleaned, &b""[..]).into_owned();
        }
        (cleaned.len() != content.len()).then_some(cleaned)
    }

    /// Clean every page content stream of `doc` in place. Returns how many
    /// streams were rewritten; an untouched document is left as it was.
    pub fn clean_document(&self, doc: &mut Document) -> usize {
        let mut rewritten = 0;

        let page_ids: Vec<_> = doc.get_pages().into_values().collect();
        for page_id in page_ids {
            for content_id in doc.get_page_contents(page_id) {
                let Ok(Object::Stream(stream)) = doc.get_object_mut(content_id) else {
                    continue;
                };
                let content = match stream.decompressed_content() {
                    Ok(data) => data,
                    Err(_) => stream.content.clone(),
                };
                if let Some(cleaned) = self.clean_stream(&content) {
                    trace!(
                        "Stream {:?}: {} -> {} bytes",
                        content_id,
                        content.len(),
                        cleaned.len()
                    );
                    stream.set_plain_content(cleaned);
                    rewritten += 1;
                }
            }
        }

        debug!("Removed watermarks from {} content streams", rewritten);
        rewritten
    }
}

impl Default for WatermarkCleaner {
    fn default() -> Self {
        Self::new()
    }
}
