//! Subcommands of the `brdoc` CLI and the helpers they share.

pub mod batch;
pub mod config;
pub mod entities;
pub mod models;
pub mod output;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use brdoc_core::engine::{ExtractionResult, PageInput};
use brdoc_core::{BrdocConfig, DocumentProcessor};

/// Input extensions the CLI understands.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

/// `<config dir>/brdoc/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("brdoc")
        .join("config.json")
}

/// Configuration from `--config`, else the default file when it exists, else
/// built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BrdocConfig> {
    if let Some(path) = config_path {
        return Ok(BrdocConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(BrdocConfig::from_file(&path)?)
    } else {
        Ok(BrdocConfig::default())
    }
}

/// Lower-cased file extension.
pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Parse a page selection such as `1-3,5` into sorted, distinct page numbers.
pub fn parse_pages(selection: &str) -> anyhow::Result<Vec<u32>> {
    let mut pages = Vec::new();
    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (first, last) = match part.split_once('-') {
            Some((a, b)) => (a.trim().parse::<u32>()?, b.trim().parse::<u32>()?),
            None => {
                let page = part.parse::<u32>()?;
                (page, page)
            }
        };
        if first == 0 || last < first {
            anyhow::bail!("Invalid page range: {}", part);
        }
        pages.extend(first..=last);
    }

    pages.sort_unstable();
    pages.dedup();
    if pages.is_empty() {
        anyhow::bail!("Empty page selection: {:?}", selection);
    }
    Ok(pages)
}

/// Run one input file through the processor.
pub fn process_file(
    processor: &DocumentProcessor,
    path: &Path,
    pages: Option<&[u32]>,
    model: Option<&str>,
) -> anyhow::Result<ExtractionResult> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    match extension(path).as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            Ok(processor.process_pdf(&source, &data, pages, model)?)
        }
        "txt" => {
            let data = fs::read(path)?;
            let text = String::from_utf8_lossy(&data);
            let mut inputs = PageInput::split_pages(&text);
            if let Some(selected) = pages {
                if let Some(bad) = selected.iter().find(|&&p| p as usize > inputs.len()) {
                    anyhow::bail!("Page {} out of range ({} pages)", bad, inputs.len());
                }
                inputs.retain(|page| selected.contains(&(page.number as u32)));
            }
            Ok(processor.process_pages(&source, inputs, model)?)
        }
        other => anyhow::bail!("Unsupported file format: {}", other),
    }
}
