//! Process command - extract data from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use brdoc_core::DocumentProcessor;

use super::output::{format_result, OutputFormat};
use super::{load_config, parse_pages, process_file};

/// Number of detection scores listed by `--show-scores`.
const SCORES_SHOWN: usize = 5;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.pdf, or .txt with pages split by form feeds)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Document model name (default: auto-detect)
    #[arg(short, long)]
    model: Option<String>,

    /// Pages to process, e.g. "1-3,5"
    #[arg(short, long)]
    pages: Option<String>,

    /// Keep per-page tables instead of merging pages by period
    #[arg(long)]
    no_consolidate: bool,

    /// Show detection scores of the best models
    #[arg(long)]
    show_scores: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.no_consolidate {
        config.output.consolidate = false;
    }
    let delimiter = config.csv_delimiter();
    let processor = DocumentProcessor::new(config);

    let pages = args.pages.as_deref().map(parse_pages).transpose()?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Extracting {}...", args.input.display()));

    let result = process_file(&processor, &args.input, pages.as_deref(), args.model.as_deref());
    pb.finish_and_clear();
    let result = result?;

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_result(&result, args.format, delimiter)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_scores {
        let mut scores = processor.registry().scores(&result.text);
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));

        eprintln!();
        eprintln!("{}", style("Detection scores:").bold());
        for (name, score) in scores.iter().take(SCORES_SHOWN) {
            eprintln!("  {:>5.1}%  {}", score * 100.0, name);
        }
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
